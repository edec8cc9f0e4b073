//! Relative strength index with Wilder smoothing.

use super::non_zero;

/// RSI over close prices. Seed averages come from the first `period` deltas,
/// each later bar blends in with weight `1 / period`. Output has
/// `values.len() - period` elements.
pub fn rsi(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() <= period {
        return None;
    }

    let mut gains = Vec::with_capacity(values.len() - 1);
    let mut losses = Vec::with_capacity(values.len() - 1);
    for pair in values.windows(2) {
        let delta = pair[1] - pair[0];
        if delta >= 0.0 {
            gains.push(delta);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-delta);
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period);
    let rs = avg_gain / non_zero(avg_loss);
    out.push(100.0 - 100.0 / (1.0 + rs));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[i]) / period as f64;
        let rs = avg_gain / non_zero(avg_loss);
        out.push(100.0 - 100.0 / (1.0 + rs));
    }

    Some(out)
}
