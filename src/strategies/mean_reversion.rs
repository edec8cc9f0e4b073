//! Mean-reversion strategy.
//!
//! Buys oscillator extremes: oversold RSI/stochastic/Williams %R and closes
//! at or below the lower Bollinger band, targeting a snap back to the middle
//! and upper bands. A strong daily downtrend halves the score so the strategy
//! does not catch falling knives.

use crate::strategies::{
    detect_levels, detect_patterns, format_price, insufficient_output, patterns::has_direction,
    risk_reward, targets_from_ratios, trend_analysis, Strategy, StrategyContext,
};
use crate::types::{
    AdvancedAnalysis, EntryKind, EntryPoint, PatternDirection, ProfitTarget, Reason,
    RecommendationSummary, StopLoss, TradeRecommendation,
};

/// Tunables of the mean-reversion strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionParams {
    pub rsi_oversold: f64,
    pub rsi_extreme: f64,
    pub stoch_oversold: f64,
    pub willr_oversold: f64,
    /// Daily trend strength at or below which the score is halved.
    pub downtrend_guard: f64,
    pub stop_atr_multiple: f64,
    pub fallback_stop_fraction: f64,
    /// Reward multiples used when no Bollinger bands are available.
    pub fallback_target_ratios: Vec<f64>,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_extreme: 20.0,
            stoch_oversold: 20.0,
            willr_oversold: -80.0,
            downtrend_guard: -0.5,
            stop_atr_multiple: 1.0,
            fallback_stop_fraction: 0.015,
            fallback_target_ratios: vec![1.0, 2.0],
        }
    }
}

pub struct MeanReversionStrategy {
    params: MeanReversionParams,
}

impl MeanReversionStrategy {
    pub fn new() -> Self {
        Self { params: MeanReversionParams::default() }
    }

    pub fn with_params(params: MeanReversionParams) -> Self {
        Self { params }
    }
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MeanReversionStrategy {
    fn id(&self) -> &'static str {
        "mean_reversion"
    }

    fn name(&self) -> &'static str {
        "Mean Reversion"
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> AdvancedAnalysis {
        if !ctx.has_any_timeframe() {
            return insufficient_output(&ctx.bundle.symbol);
        }

        let p = &self.params;
        let price = ctx.price();
        let trend = trend_analysis(ctx);
        let patterns = detect_patterns(ctx.pattern_candles());
        let sr = detect_levels(ctx.level_candles(), price);
        let hourly = ctx.one_hour().or_else(|| ctx.four_hour()).or_else(|| ctx.daily());

        let rsi = hourly.and_then(|s| s.rsi_value(14));
        let stoch_k = hourly.and_then(|s| s.stochastic).map(|s| s.k);
        let willr = hourly.and_then(|s| s.willr);
        let bb = hourly.and_then(|s| s.bb);

        let mut score: f64 = 0.0;
        let mut reasons = Vec::new();

        if let Some(r) = rsi {
            if r <= p.rsi_oversold {
                score += 0.3;
                reasons.push(Reason::new("rsi_oversold").with("rsi", format!("{:.1}", r)));
            }
            if r <= p.rsi_extreme {
                score += 0.15;
                reasons.push(Reason::new("rsi_extreme").with("rsi", format!("{:.1}", r)));
            }
        }
        if let Some(k) = stoch_k {
            if k <= p.stoch_oversold {
                score += 0.15;
                reasons.push(Reason::new("stoch_oversold").with("k", format!("{:.1}", k)));
            }
        }
        if let Some(w) = willr {
            if w <= p.willr_oversold {
                score += 0.1;
                reasons.push(Reason::new("willr_oversold").with("willr", format!("{:.1}", w)));
            }
        }
        if let Some(band) = bb {
            if price > 0.0 && price <= band.lower {
                score += 0.2;
                reasons.push(
                    Reason::new("below_lower_band").with("lower", format_price(band.lower)),
                );
            }
        }
        if has_direction(&patterns, PatternDirection::Bullish) {
            score += 0.1;
            reasons.push(Reason::new("bullish_pattern"));
        }

        let daily_strength = ctx.daily().map(|s| s.trend_strength).unwrap_or(0.0);
        if daily_strength <= p.downtrend_guard {
            score *= 0.5;
            reasons.push(
                Reason::new("falling_knife_guard")
                    .with("trendStrength", format!("{:.2}", daily_strength)),
            );
        }

        if reasons.is_empty() {
            reasons.push(Reason::new("no_reversion_setup"));
        }

        let confidence = score.clamp(0.0, 1.0);
        let recommendation = TradeRecommendation::from_score(confidence);

        let stop_loss = if price > 0.0 {
            let distance = ctx
                .atr()
                .map(|a| a * p.stop_atr_multiple)
                .unwrap_or(price * p.fallback_stop_fraction);
            Some(StopLoss { price: price - distance, distance })
        } else {
            None
        };

        // Targets aim back at the middle and upper bands; without bands the
        // plain R ladder applies.
        let mut profit_targets = Vec::new();
        if let (Some(stop), Some(band)) = (stop_loss, bb) {
            if stop.distance > 0.0 {
                for target in [band.mid, band.upper] {
                    if target > price {
                        profit_targets.push(ProfitTarget {
                            price: target,
                            ratio: (target - price) / stop.distance,
                        });
                    }
                }
            }
        }
        if profit_targets.is_empty() {
            if let Some(stop) = stop_loss {
                profit_targets = targets_from_ratios(price, stop.distance, &p.fallback_target_ratios);
            }
        }
        let rr = risk_reward(&profit_targets);

        let mut entry_points = Vec::new();
        if price > 0.0 {
            if let Some(band) = bb {
                if band.lower < price {
                    entry_points.push(EntryPoint {
                        kind: EntryKind::Limit,
                        price: band.lower,
                        confidence: confidence * 0.9,
                        reason: Reason::new("limit_at_lower_band"),
                        level: "bb_lower".to_string(),
                        required_confirmation: false,
                    });
                }
            }
            if rsi.map(|r| r <= p.rsi_extreme).unwrap_or(false) {
                entry_points.push(EntryPoint {
                    kind: EntryKind::Market,
                    price,
                    confidence,
                    reason: Reason::new("oversold_extreme"),
                    level: "market".to_string(),
                    required_confirmation: !recommendation.is_actionable(),
                });
            }
        }

        let fmt = |v: Option<f64>| v.map(|x| format!("{:.1}", x)).unwrap_or_else(|| "n/a".to_string());
        let mut lines = vec![
            format!(
                "{}: {} (confidence {:.0}%)",
                ctx.bundle.symbol,
                recommendation.label(),
                confidence * 100.0
            ),
            format!(
                "Oversold checks: RSI(14) {}, stochastic %K {}, Williams %R {}",
                fmt(rsi),
                fmt(stoch_k),
                fmt(willr)
            ),
        ];
        if let Some(stop) = stop_loss {
            lines.push(format!("Stop {} ({} wide)", format_price(stop.price), format_price(stop.distance)));
        }

        AdvancedAnalysis {
            recommendation: RecommendationSummary {
                recommendation,
                confidence_score: confidence,
                detailed_reasons: reasons,
            },
            trend_analysis: trend,
            stop_loss,
            profit_targets,
            risk_reward: rr,
            entry_points,
            candle_patterns: patterns,
            support_resistance: Some(sr),
            detailed_report: lines.join("\n"),
        }
    }
}
