//! On-balance volume.

use crate::types::Candle;

/// Cumulative OBV. Each bar adds its volume when the close rose, subtracts it
/// when the close fell, and carries the running total when unchanged. Output
/// has `candles.len() - 1` elements.
pub fn obv(candles: &[Candle]) -> Option<Vec<f64>> {
    if candles.len() < 2 {
        return None;
    }

    let mut running = 0.0;
    let out = candles
        .windows(2)
        .map(|pair| {
            if pair[1].close > pair[0].close {
                running += pair[1].volume;
            } else if pair[1].close < pair[0].close {
                running -= pair[1].volume;
            }
            running
        })
        .collect();

    Some(out)
}
