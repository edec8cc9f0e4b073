//! Average directional index with directional movement lines.

use super::non_zero;
use crate::types::Candle;

/// ADX output. `plus_di` and `minus_di` are one Wilder pass long, `adx` is a
/// second pass over the DX values and shorter by `period`.
#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

/// Wilder running sum: seed with the plain sum of the first `period` values,
/// then `prev - prev / period + x`.
fn wilder_sum(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut prev = values[..period].iter().sum::<f64>();
    out.push(prev);
    for &x in &values[period..] {
        prev = prev - prev / period as f64 + x;
        out.push(prev);
    }
    out
}

/// Directional movement and trend strength. Needs more than `2 * period`
/// candles since the ADX line smooths the DX series a second time.
pub fn adx(candles: &[Candle], period: usize) -> Option<AdxSeries> {
    if period == 0 || candles.len() <= 2 * period {
        return None;
    }

    let mut plus_dm = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm = Vec::with_capacity(candles.len() - 1);
    let mut true_ranges = Vec::with_capacity(candles.len() - 1);
    for pair in candles.windows(2) {
        let up = pair[1].high - pair[0].high;
        let down = pair[0].low - pair[1].low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        let prev_close = pair[0].close;
        true_ranges.push(
            (pair[1].high - pair[1].low)
                .max((pair[1].high - prev_close).abs())
                .max((pair[1].low - prev_close).abs()),
        );
    }

    let smooth_plus = wilder_sum(&plus_dm, period);
    let smooth_minus = wilder_sum(&minus_dm, period);
    let smooth_tr = wilder_sum(&true_ranges, period);

    let plus_di: Vec<f64> = smooth_plus
        .iter()
        .zip(smooth_tr.iter())
        .map(|(dm, tr)| 100.0 * dm / non_zero(*tr))
        .collect();
    let minus_di: Vec<f64> = smooth_minus
        .iter()
        .zip(smooth_tr.iter())
        .map(|(dm, tr)| 100.0 * dm / non_zero(*tr))
        .collect();

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(minus_di.iter())
        .map(|(p, m)| 100.0 * (p - m).abs() / non_zero(p + m))
        .collect();

    let mut prev = dx[..period].iter().sum::<f64>() / period as f64;
    let mut adx_line = Vec::with_capacity(dx.len() - period + 1);
    adx_line.push(prev);
    for &x in &dx[period..] {
        prev = (prev * (period as f64 - 1.0) + x) / period as f64;
        adx_line.push(prev);
    }

    Some(AdxSeries {
        plus_di,
        minus_di,
        adx: adx_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: 0,
            open: close,
            high,
            low,
            close,
            volume: 1.0,
            quote_volume: 0.0,
            num_trades: 0,
            taker_buy_volume: 0.0,
            taker_buy_quote_volume: 0.0,
        }
    }

    #[test]
    fn test_insufficient_input() {
        let candles: Vec<Candle> = (0..28)
            .map(|i| candle(10.0 + i as f64, 9.0 + i as f64, 9.5 + i as f64))
            .collect();
        // Needs strictly more than 2 * 14 candles.
        assert!(adx(&candles, 14).is_none());
        assert!(adx(&candles, 0).is_none());
    }

    #[test]
    fn test_strong_uptrend_reads_high() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base + 1.0, base - 1.0, base)
            })
            .collect();
        let out = adx(&candles, 14).unwrap();
        let last_adx = out.adx[out.adx.len() - 1];
        let last_plus = out.plus_di[out.plus_di.len() - 1];
        let last_minus = out.minus_di[out.minus_di.len() - 1];
        assert!(last_adx > 25.0);
        assert!(last_plus > last_minus);
    }

    #[test]
    fn test_strong_downtrend_favors_minus_di() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let base = 300.0 - i as f64 * 2.0;
                candle(base + 1.0, base - 1.0, base)
            })
            .collect();
        let out = adx(&candles, 14).unwrap();
        let last_plus = out.plus_di[out.plus_di.len() - 1];
        let last_minus = out.minus_di[out.minus_di.len() - 1];
        assert!(last_minus > last_plus);
    }

    #[test]
    fn test_series_lengths() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let base = 100.0 + ((i * 7) % 5) as f64;
                candle(base + 1.0, base - 1.0, base)
            })
            .collect();
        let out = adx(&candles, 14).unwrap();
        // 59 deltas, one Wilder pass leaves 46, the second leaves 33.
        assert_eq!(out.plus_di.len(), 46);
        assert_eq!(out.minus_di.len(), 46);
        assert_eq!(out.adx.len(), 33);
        for v in out.adx {
            assert!(v.is_finite());
        }
    }
}
