//! Simple moving average.

/// Rolling mean over `period` values. Output has `values.len() - period + 1`
/// elements, one per full window.
pub fn sma(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    out.push(sum / period as f64);

    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out.push(sum / period as f64);
    }

    Some(out)
}
