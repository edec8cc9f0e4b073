//! Technical indicator implementations.
//!
//! Every indicator is a pure function over an immutable input slice and
//! returns `None` when the input is shorter than the indicator's minimum.
//! Outputs are full series aligned to the tail of the input so the replay
//! engine can index them; live analysis reads the last element.
//!
//! Near-zero denominators are floored at [`EPSILON`] instead of producing
//! NaN or infinity. Downstream thresholds are tuned against that floor, so
//! it must not change.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;
pub mod williams_r;

pub use adx::{adx, AdxSeries};
pub use atr::atr;
pub use bollinger::{bollinger, BollingerPoint};
pub use ema::ema;
pub use macd::{macd, MacdSeries};
pub use mfi::mfi;
pub use obv::obv;
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic, StochasticSeries};
pub use vwap::vwap;
pub use williams_r::williams_r;

/// Floor substituted for denominators that are exactly zero.
pub const EPSILON: f64 = 1e-8;

/// Replace an exactly-zero denominator with [`EPSILON`].
pub(crate) fn non_zero(value: f64) -> f64 {
    if value == 0.0 {
        EPSILON
    } else {
        value
    }
}

/// Arithmetic mean of a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
