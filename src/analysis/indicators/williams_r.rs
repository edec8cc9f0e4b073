//! Williams %R.

use super::non_zero;
use crate::types::Candle;

/// Williams %R over rolling `period` windows, ranging from -100 (close at the
/// low) to 0 (close at the high). Output has `candles.len() - period + 1`
/// elements.
pub fn williams_r(candles: &[Candle], period: usize) -> Option<Vec<f64>> {
    if period == 0 || candles.len() < period {
        return None;
    }

    let out = candles
        .windows(period)
        .map(|window| {
            let highest = window.iter().fold(f64::MIN, |acc, c| acc.max(c.high));
            let lowest = window.iter().fold(f64::MAX, |acc, c| acc.min(c.low));
            let close = window[window.len() - 1].close;
            -100.0 * (highest - close) / non_zero(highest - lowest)
        })
        .collect();

    Some(out)
}
