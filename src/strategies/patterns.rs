//! Candle-pattern detection on the most recent bars.

use crate::types::{Candle, CandlePattern, PatternDirection};

fn pattern(name: &str, direction: PatternDirection) -> CandlePattern {
    CandlePattern { name: name.to_string(), direction }
}

/// Detect single-bar patterns on the last candle and two-bar engulfing
/// patterns on the last pair. Returns every pattern that matches, in a fixed
/// order.
pub fn detect_patterns(candles: &[Candle]) -> Vec<CandlePattern> {
    let mut out = Vec::new();
    let last = match candles.last() {
        Some(c) => c,
        None => return out,
    };

    let body = (last.close - last.open).abs();
    let range = last.high - last.low;

    if range > 0.0 {
        if body <= 0.1 * range {
            out.push(pattern("doji", PatternDirection::Neutral));
        } else {
            let lower_wick = last.open.min(last.close) - last.low;
            let upper_wick = last.high - last.open.max(last.close);
            if lower_wick >= 2.0 * body && upper_wick <= body {
                out.push(pattern("hammer", PatternDirection::Bullish));
            }
            if upper_wick >= 2.0 * body && lower_wick <= body {
                out.push(pattern("shooting_star", PatternDirection::Bearish));
            }
        }
    }

    if candles.len() >= 2 {
        let prev = &candles[candles.len() - 2];
        let prev_bearish = prev.close < prev.open;
        let prev_bullish = prev.close > prev.open;
        let last_bullish = last.close > last.open;
        let last_bearish = last.close < last.open;

        if prev_bearish && last_bullish && last.close >= prev.open && last.open <= prev.close {
            out.push(pattern("bullish_engulfing", PatternDirection::Bullish));
        }
        if prev_bullish && last_bearish && last.close <= prev.open && last.open >= prev.close {
            out.push(pattern("bearish_engulfing", PatternDirection::Bearish));
        }
    }

    out
}

/// True when any detected pattern points the given way.
pub fn has_direction(patterns: &[CandlePattern], direction: PatternDirection) -> bool {
    patterns.iter().any(|p| p.direction == direction)
}
