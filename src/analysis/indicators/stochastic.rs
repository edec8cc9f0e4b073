//! Stochastic oscillator.

use super::{mean, non_zero};
use crate::types::Candle;

/// Smoothed %K and its %D signal line. `d` is shorter than `k` by
/// `d_period - 1` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Raw %K positions the close inside the high/low range of each `k_period`
/// window, smoothed %K averages `smooth_k` raw values, %D averages `d_period`
/// smoothed values.
pub fn stochastic(
    candles: &[Candle],
    k_period: usize,
    d_period: usize,
    smooth_k: usize,
) -> Option<StochasticSeries> {
    if k_period == 0 || d_period == 0 || smooth_k == 0 {
        return None;
    }
    if candles.len() < k_period + smooth_k + d_period - 2 {
        return None;
    }

    let raw: Vec<f64> = candles
        .windows(k_period)
        .map(|window| {
            let highest = window.iter().fold(f64::MIN, |acc, c| acc.max(c.high));
            let lowest = window.iter().fold(f64::MAX, |acc, c| acc.min(c.low));
            let close = window[window.len() - 1].close;
            100.0 * (close - lowest) / non_zero(highest - lowest)
        })
        .collect();

    let k: Vec<f64> = raw.windows(smooth_k).map(mean).collect();
    let d: Vec<f64> = k.windows(d_period).map(mean).collect();

    Some(StochasticSeries { k, d })
}
