//! Swing-pivot support/resistance detection.

use crate::types::{Candle, PriceLevel, SupportResistance};

/// A pivot high/low must exceed this many neighbors on each side.
const PIVOT_SPAN: usize = 2;
/// Pivots within this fraction of a cluster's mean merge into one level.
const CLUSTER_TOLERANCE: f64 = 0.005;
/// Touches needed for full strength.
const FULL_STRENGTH_TOUCHES: f64 = 4.0;
/// Levels reported per side, nearest first.
const MAX_LEVELS_PER_SIDE: usize = 5;

/// Swing-pivot prices: highs above and lows below their two neighbors on each
/// side.
fn swing_points(candles: &[Candle]) -> Vec<f64> {
    let mut pivots = Vec::new();
    if candles.len() < 2 * PIVOT_SPAN + 1 {
        return pivots;
    }

    for i in PIVOT_SPAN..candles.len() - PIVOT_SPAN {
        let high = candles[i].high;
        let low = candles[i].low;
        let mut is_high = true;
        let mut is_low = true;
        for offset in 1..=PIVOT_SPAN {
            if candles[i - offset].high >= high || candles[i + offset].high >= high {
                is_high = false;
            }
            if candles[i - offset].low <= low || candles[i + offset].low <= low {
                is_low = false;
            }
        }
        if is_high {
            pivots.push(high);
        }
        if is_low {
            pivots.push(low);
        }
    }

    pivots
}

/// Merge sorted pivot prices into clusters no wider than the tolerance around
/// their running mean.
fn cluster(mut pivots: Vec<f64>) -> Vec<PriceLevel> {
    pivots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut levels = Vec::new();
    let mut members: Vec<f64> = Vec::new();

    let flush = |members: &mut Vec<f64>, levels: &mut Vec<PriceLevel>| {
        if members.is_empty() {
            return;
        }
        let mean = members.iter().sum::<f64>() / members.len() as f64;
        levels.push(PriceLevel {
            price: mean,
            strength: (members.len() as f64 / FULL_STRENGTH_TOUCHES).min(1.0),
            count: members.len() as u32,
        });
        members.clear();
    };

    for price in pivots {
        match members.last() {
            Some(_) => {
                let mean = members.iter().sum::<f64>() / members.len() as f64;
                if mean != 0.0 && ((price - mean) / mean).abs() <= CLUSTER_TOLERANCE {
                    members.push(price);
                } else {
                    flush(&mut members, &mut levels);
                    members.push(price);
                }
            }
            None => members.push(price),
        }
    }
    flush(&mut members, &mut levels);

    levels
}

/// Detect horizontal support/resistance levels from swing pivots, split
/// around `current_price` and ordered nearest first.
pub fn detect_levels(candles: &[Candle], current_price: f64) -> SupportResistance {
    let levels = cluster(swing_points(candles));

    let mut support: Vec<PriceLevel> = levels
        .iter()
        .filter(|l| l.price < current_price)
        .copied()
        .collect();
    let mut resistance: Vec<PriceLevel> = levels
        .iter()
        .filter(|l| l.price >= current_price)
        .copied()
        .collect();

    // Nearest first: supports descend toward zero, resistances ascend away.
    support.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(std::cmp::Ordering::Equal));
    resistance.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
    support.truncate(MAX_LEVELS_PER_SIDE);
    resistance.truncate(MAX_LEVELS_PER_SIDE);

    SupportResistance { support, resistance }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: 0,
            open,
            high,
            low,
            close,
            volume: 100.0,
            quote_volume: 0.0,
            num_trades: 0,
            taker_buy_volume: 0.0,
            taker_buy_quote_volume: 0.0,
        }
    }

    /// Zig-zag series bouncing between a floor near 95 and a ceiling near
    /// 105, so both become multi-touch levels.
    fn zigzag(cycles: usize) -> Vec<Candle> {
        let mut out = Vec::new();
        for _ in 0..cycles {
            out.push(candle(96.0, 97.0, 95.0, 96.5));
            out.push(candle(96.5, 99.0, 96.0, 98.5));
            out.push(candle(98.5, 101.0, 98.0, 100.5));
            out.push(candle(100.5, 103.0, 100.0, 102.5));
            out.push(candle(102.5, 105.0, 102.0, 104.0));
            out.push(candle(104.0, 104.5, 101.5, 102.0));
            out.push(candle(102.0, 102.5, 99.5, 100.0));
            out.push(candle(100.0, 100.5, 97.5, 98.0));
        }
        out
    }

    #[test]
    fn test_too_few_candles_yields_no_levels() {
        let candles: Vec<Candle> = (0..4).map(|_| candle(100.0, 101.0, 99.0, 100.0)).collect();
        let sr = detect_levels(&candles, 100.0);
        assert!(sr.support.is_empty());
        assert!(sr.resistance.is_empty());
    }

    #[test]
    fn test_zigzag_produces_levels_both_sides() {
        let candles = zigzag(6);
        let sr = detect_levels(&candles, 100.0);
        assert!(!sr.support.is_empty());
        assert!(!sr.resistance.is_empty());

        for level in &sr.support {
            assert!(level.price < 100.0);
            assert!(level.strength > 0.0 && level.strength <= 1.0);
            assert!(level.count >= 1);
        }
        for level in &sr.resistance {
            assert!(level.price >= 100.0);
        }
    }

    #[test]
    fn test_levels_sorted_nearest_first() {
        let candles = zigzag(6);
        let sr = detect_levels(&candles, 100.0);
        for pair in sr.support.windows(2) {
            assert!(pair[0].price >= pair[1].price);
        }
        for pair in sr.resistance.windows(2) {
            assert!(pair[0].price <= pair[1].price);
        }
    }

    #[test]
    fn test_repeated_touches_gain_strength() {
        // The 105 ceiling is touched once per cycle; six cycles max out the
        // four-touch strength scale.
        let candles = zigzag(6);
        let sr = detect_levels(&candles, 100.0);
        let ceiling = sr
            .resistance
            .iter()
            .find(|l| (l.price - 105.0).abs() < 1.0)
            .expect("ceiling level detected");
        assert_eq!(ceiling.strength, 1.0);
        assert!(ceiling.count >= 4);
    }

    #[test]
    fn test_cluster_merges_nearby_pivots() {
        let levels = cluster(vec![100.0, 100.2, 100.4, 110.0]);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].count, 3);
        assert_eq!(levels[1].count, 1);
        assert!((levels[0].price - 100.2).abs() < 1e-9);
    }
}
