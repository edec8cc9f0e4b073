//! Balanced default strategy.
//!
//! Blends the composite signal with trend strength, nudged by candle
//! patterns. The all-rounder: no single indicator family dominates, which is
//! why it is the fallback for unknown strategy ids.

use crate::strategies::{
    detect_levels, detect_patterns, format_price, insufficient_output, patterns::has_direction,
    risk_reward, targets_from_ratios, trend_analysis, Strategy, StrategyContext,
};
use crate::types::{
    AdvancedAnalysis, EntryKind, EntryPoint, PatternDirection, Reason, RecommendationSummary,
    StopLoss, TradeRecommendation, TrendDirection,
};

/// Tunables of the balanced strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedParams {
    /// Weight of the composite score in the confidence blend.
    pub signal_weight: f64,
    /// Weight of the normalized trend strength.
    pub trend_weight: f64,
    /// Confidence adjustment per detected pattern direction.
    pub pattern_nudge: f64,
    /// ATR multiple for the stop distance.
    pub stop_atr_multiple: f64,
    /// Stop distance as a fraction of price when no ATR is available.
    pub fallback_stop_fraction: f64,
    /// Reward multiples for the profit ladder.
    pub target_ratios: Vec<f64>,
}

impl Default for BalancedParams {
    fn default() -> Self {
        Self {
            signal_weight: 0.7,
            trend_weight: 0.3,
            pattern_nudge: 0.05,
            stop_atr_multiple: 1.5,
            fallback_stop_fraction: 0.02,
            target_ratios: vec![1.5, 2.5, 4.0],
        }
    }
}

pub struct BalancedStrategy {
    params: BalancedParams,
}

impl BalancedStrategy {
    pub fn new() -> Self {
        Self { params: BalancedParams::default() }
    }

    pub fn with_params(params: BalancedParams) -> Self {
        Self { params }
    }
}

impl Default for BalancedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for BalancedStrategy {
    fn id(&self) -> &'static str {
        "main_balanced"
    }

    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> AdvancedAnalysis {
        if !ctx.has_any_timeframe() {
            return insufficient_output(&ctx.bundle.symbol);
        }

        let p = &self.params;
        let price = ctx.price();
        let signal = ctx.signal();
        let trend = trend_analysis(ctx);
        let patterns = detect_patterns(ctx.pattern_candles());
        let sr = detect_levels(ctx.level_candles(), price);

        let strength = ctx
            .daily()
            .or_else(|| ctx.four_hour())
            .or_else(|| ctx.one_hour())
            .map(|s| s.trend_strength)
            .unwrap_or(0.0);
        // Trend strength is signed in [-1, 1]; shift it into [0, 1] so the
        // blend stays a convex combination.
        let trend_term = (strength + 1.0) / 2.0;

        let mut confidence = signal.score * p.signal_weight + trend_term * p.trend_weight;
        if has_direction(&patterns, PatternDirection::Bullish) {
            confidence += p.pattern_nudge;
        }
        if has_direction(&patterns, PatternDirection::Bearish) {
            confidence -= p.pattern_nudge;
        }
        let confidence = confidence.clamp(0.0, 1.0);
        let recommendation = TradeRecommendation::from_score(confidence);

        let mut reasons = vec![
            Reason::new("composite_score").with("score", format!("{:.2}", signal.score)),
            Reason::new(match trend.direction {
                TrendDirection::Up => "trend_up",
                TrendDirection::Down => "trend_down",
                TrendDirection::Sideways => "trend_sideways",
            })
            .with("confidence", format!("{:.2}", trend.confidence)),
        ];
        if signal.flags.momentum_flag >= 0.8 {
            reasons.push(Reason::new("momentum_strong"));
        }
        if signal.flags.volume_flag >= 0.8 {
            reasons.push(Reason::new("volume_supportive"));
        }
        for pattern in &patterns {
            reasons.push(Reason::new("candle_pattern").with("name", pattern.name.clone()));
        }

        let stop_loss = if price > 0.0 {
            let distance = ctx
                .atr()
                .map(|a| a * p.stop_atr_multiple)
                .unwrap_or(price * p.fallback_stop_fraction);
            Some(StopLoss { price: price - distance, distance })
        } else {
            None
        };

        let profit_targets = stop_loss
            .map(|s| targets_from_ratios(price, s.distance, &p.target_ratios))
            .unwrap_or_default();
        let rr = risk_reward(&profit_targets);

        let mut entry_points = Vec::new();
        if price > 0.0 {
            entry_points.push(EntryPoint {
                kind: EntryKind::Market,
                price,
                confidence,
                reason: Reason::new("market_entry"),
                level: "market".to_string(),
                required_confirmation: !recommendation.is_actionable(),
            });
            if let Some(e21) = ctx.one_hour().and_then(|s| s.ema_value(21)) {
                if e21 < price {
                    entry_points.push(EntryPoint {
                        kind: EntryKind::Limit,
                        price: e21,
                        confidence: confidence * 0.9,
                        reason: Reason::new("pullback_to_ema21"),
                        level: "ema21".to_string(),
                        required_confirmation: false,
                    });
                }
            }
            if let Some(support) = sr.support.first() {
                entry_points.push(EntryPoint {
                    kind: EntryKind::Limit,
                    price: support.price,
                    confidence: confidence * 0.85,
                    reason: Reason::new("pullback_to_support")
                        .with("strength", format!("{:.2}", support.strength)),
                    level: "support".to_string(),
                    required_confirmation: false,
                });
            }
        }

        let mut lines = vec![
            format!(
                "{}: {} at {} (confidence {:.0}%)",
                ctx.bundle.symbol,
                recommendation.label(),
                format_price(price),
                confidence * 100.0
            ),
            format!(
                "Trend {} ({:.0}%), composite score {:.2}",
                trend.direction.label(),
                trend.confidence * 100.0,
                signal.score
            ),
        ];
        if let Some(stop) = stop_loss {
            let targets = profit_targets
                .iter()
                .map(|t| format_price(t.price))
                .collect::<Vec<_>>()
                .join(" / ");
            lines.push(format!("Stop {}, targets {}", format_price(stop.price), targets));
        }
        if !patterns.is_empty() {
            let names = patterns.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ");
            lines.push(format!("Patterns: {}", names));
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
