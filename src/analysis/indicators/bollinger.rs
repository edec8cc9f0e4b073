//! Bollinger bands.

use super::sma;

/// One band reading. `mid` is the SMA, `upper` and `lower` sit `std_devs`
/// population standard deviations away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub mid: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Bollinger bands over close prices. Output has
/// `values.len() - period + 1` elements.
pub fn bollinger(values: &[f64], period: usize, std_devs: f64) -> Option<Vec<BollingerPoint>> {
    let mid = sma(values, period)?;

    let out = mid
        .iter()
        .enumerate()
        .map(|(i, &m)| {
            let window = &values[i..i + period];
            let variance =
                window.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / period as f64;
            let sd = variance.sqrt();
            BollingerPoint {
                mid: m,
                upper: m + std_devs * sd,
                lower: m - std_devs * sd,
            }
        })
        .collect();

    Some(out)
}
