//! Exponential moving average.

/// EMA with multiplier `2 / (period + 1)`, seeded with the SMA of the first
/// `period` values. Output has `values.len() - period + 1` elements.
pub fn ema(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    out.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = (value - prev) * multiplier + prev;
        out.push(prev);
    }

    Some(out)
}
