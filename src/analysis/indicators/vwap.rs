//! Volume-weighted average price.

use crate::types::Candle;

/// Single VWAP figure over the whole series, weighting each bar's typical
/// price by its volume. `None` when the series is empty or carries no volume.
pub fn vwap(candles: &[Candle]) -> Option<f64> {
    if candles.is_empty() {
        return None;
    }

    let mut weighted = 0.0;
    let mut volume = 0.0;
    for c in candles {
        weighted += c.typical_price() * c.volume;
        volume += c.volume;
    }

    if volume == 0.0 {
        return None;
    }
    Some(weighted / volume)
}
