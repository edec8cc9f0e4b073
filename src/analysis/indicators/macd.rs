//! Moving average convergence divergence.

use super::ema;

/// Aligned MACD output. All three series share the same length and index
/// against the tail of the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD line is `EMA(fast) - EMA(slow)` after aligning both to the slow
/// series, signal is an EMA of the MACD line, histogram the difference.
pub fn macd(
    values: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdSeries> {
    if fast_period == 0 || slow_period == 0 || fast_period >= slow_period {
        return None;
    }

    let fast = ema(values, fast_period)?;
    let slow = ema(values, slow_period)?;

    // The fast series starts earlier. Trim its head so both line up on the
    // same candles.
    let align = fast.len() - slow.len();
    let macd_line: Vec<f64> = fast[align..]
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema(&macd_line, signal_period)?;
    let offset = macd_line.len() - signal.len();
    let macd_out = macd_line[offset..].to_vec();

    let histogram: Vec<f64> = macd_out
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| m - s)
        .collect();

    Some(MacdSeries {
        macd: macd_out,
        signal,
        histogram,
    })
}
