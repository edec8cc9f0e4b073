//! Composite signal scoring.
//!
//! Folds the three timeframe outcomes and an optional order book into five
//! weighted sub-scores and a coarse recommendation. Missing inputs degrade a
//! flag to its neutral value instead of failing.

use crate::analysis::indicators::non_zero;
use crate::config::{EngineConfig, SignalThresholds};
use crate::types::{
    CompositeSignal, OrderBookSnapshot, SignalFlags, SignalVerdict, TimeframeOutcome,
};

/// Depth band around the mid price compared when scoring book imbalance.
const DEPTH_FRACTION: f64 = 0.01;
/// Spread below this fraction of mid counts as a liquid market.
const TIGHT_SPREAD: f64 = 0.002;

fn verdict(score: f64, thresholds: &SignalThresholds) -> SignalVerdict {
    if score >= thresholds.buy {
        SignalVerdict::Buy
    } else if score >= thresholds.conditional {
        SignalVerdict::Conditional
    } else {
        SignalVerdict::Wait
    }
}

fn price_above_ema50(outcome: &TimeframeOutcome) -> bool {
    outcome
        .ready()
        .and_then(|snapshot| {
            let e50 = snapshot.ema_value(50)?;
            Some(snapshot.price != 0.0 && e50 != 0.0 && snapshot.price > e50)
        })
        .unwrap_or(false)
}

/// Weighted composite of trend, momentum, volume, book imbalance and
/// volatility. Flag formulas and their constants are tuned against the
/// default weights and thresholds; the score is clamped to [0, 1] at the end.
pub fn compose_signal(
    one_hour: &TimeframeOutcome,
    four_hour: &TimeframeOutcome,
    daily: &TimeframeOutcome,
    order_book: Option<&OrderBookSnapshot>,
    config: &EngineConfig,
) -> CompositeSignal {
    let trend_flag = match [daily, four_hour]
        .iter()
        .filter(|tf| price_above_ema50(tf))
        .count()
    {
        2 => 1.0,
        1 => 0.5,
        _ => 0.0,
    };

    let mut momentum: f64 = 0.0;
    if one_hour
        .ready()
        .and_then(|s| s.macd_hist())
        .map(|h| h > 0.0)
        .unwrap_or(false)
    {
        momentum += 0.4;
    }
    if four_hour
        .ready()
        .and_then(|s| s.macd_hist())
        .map(|h| h > 0.0)
        .unwrap_or(false)
    {
        momentum += 0.4;
    }
    if one_hour
        .ready()
        .and_then(|s| s.rsi_value(14))
        .map(|r| r > 50.0)
        .unwrap_or(false)
    {
        momentum += 0.1;
    }
    let momentum_flag = momentum.min(1.0);

    let mut volume: f64 = 0.0;
    if one_hour.ready().map(|s| s.obv.is_some()).unwrap_or(false) {
        volume += 0.5;
    }
    if one_hour
        .ready()
        .and_then(|s| s.mfi)
        .map(|m| m > 50.0)
        .unwrap_or(false)
    {
        volume += 0.3;
    }
    if order_book
        .and_then(|book| book.spread_fraction())
        .map(|spread| spread < TIGHT_SPREAD)
        .unwrap_or(false)
    {
        volume += 0.2;
    }
    let volume_flag = volume.min(1.0);

    let orderbook_flag = order_book
        .and_then(|book| book.depth_within(DEPTH_FRACTION))
        .map(|(bid_vol, ask_vol)| {
            if bid_vol + ask_vol > 0.0 {
                let ratio = bid_vol / non_zero(ask_vol);
                if ratio > 1.2 {
                    1.0
                } else if ratio < 0.8 {
                    0.0
                } else {
                    0.5
                }
            } else {
                0.5
            }
        })
        .unwrap_or(0.5);

    // Peak score at 2% ATR/price, fading linearly either side. Under 0.5% or
    // over 5% the market is too quiet or too wild to trust the setup. The
    // linear fade dips below zero between 4% and 5%; the score clamp below
    // absorbs that, matching the tuned behavior.
    let volatility_flag = one_hour
        .ready()
        .and_then(|s| {
            let atr = s.atr?;
            if atr == 0.0 || s.price == 0.0 {
                return None;
            }
            Some(atr / s.price)
        })
        .map(|ratio| {
            if ratio < 0.005 || ratio > 0.05 {
                0.2
            } else {
                1.0 - ((ratio - 0.02) / 0.02).abs()
            }
        })
        .unwrap_or(0.5);

    let w = &config.weights;
    let score = (trend_flag * w.trend
        + momentum_flag * w.momentum
        + volume_flag * w.volume
        + orderbook_flag * w.orderbook
        + volatility_flag * w.volatility)
        .clamp(0.0, 1.0);

    CompositeSignal {
        flags: SignalFlags {
            trend_flag,
            momentum_flag,
            volume_flag,
            orderbook_flag,
            volatility_flag,
        },
        score,
        recommendation: verdict(score, &config.thresholds),
    }
}
