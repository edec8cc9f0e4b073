//! Money flow index.

use super::non_zero;
use crate::types::Candle;

/// MFI over rolling `period` windows of raw money flow. Flow is classified by
/// comparing each bar's typical price against the previous bar's. Output has
/// `candles.len() - period` elements.
pub fn mfi(candles: &[Candle], period: usize) -> Option<Vec<f64>> {
    if period == 0 || candles.len() <= period {
        return None;
    }

    let mut positive = Vec::with_capacity(candles.len() - 1);
    let mut negative = Vec::with_capacity(candles.len() - 1);
    for pair in candles.windows(2) {
        let prev_tp = pair[0].typical_price();
        let tp = pair[1].typical_price();
        let flow = tp * pair[1].volume;
        if tp > prev_tp {
            positive.push(flow);
            negative.push(0.0);
        } else if tp < prev_tp {
            positive.push(0.0);
            negative.push(flow);
        } else {
            positive.push(0.0);
            negative.push(0.0);
        }
    }

    let out = positive
        .windows(period)
        .zip(negative.windows(period))
        .map(|(pos, neg)| {
            let pos_sum: f64 = pos.iter().sum();
            let neg_sum: f64 = neg.iter().sum();
            let ratio = pos_sum / non_zero(neg_sum);
            100.0 - 100.0 / (1.0 + ratio)
        })
        .collect();

    Some(out)
}
