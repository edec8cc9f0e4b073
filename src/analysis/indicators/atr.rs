//! Average true range with Wilder smoothing.

use crate::types::Candle;

/// ATR seeded with the mean of the first `period` true ranges, then Wilder
/// smoothed. Output has `candles.len() - period` elements.
pub fn atr(candles: &[Candle], period: usize) -> Option<Vec<f64>> {
    if period == 0 || candles.len() <= period {
        return None;
    }

    let true_ranges: Vec<f64> = candles
        .windows(2)
        .map(|pair| {
            let prev_close = pair[0].close;
            let c = &pair[1];
            (c.high - c.low)
                .max((c.high - prev_close).abs())
                .max((c.low - prev_close).abs())
        })
        .collect();

    let mut prev = true_ranges[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(candles.len() - period);
    out.push(prev);

    for &tr in &true_ranges[period..] {
        prev = (prev * (period as f64 - 1.0) + tr) / period as f64;
        out.push(prev);
    }

    Some(out)
}
