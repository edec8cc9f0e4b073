//! Supply/demand zone strategy.
//!
//! Trades proximity to clustered swing-low demand zones: the closer and the
//! better established the zone, the higher the score, with overhead
//! resistance penalized and profit targets set at the resistance levels
//! themselves. Without a detected zone it proposes nothing.

use crate::strategies::{
    detect_levels, detect_patterns, format_price, insufficient_output, patterns::has_direction,
    risk_reward, targets_from_ratios, trend_analysis, Strategy, StrategyContext,
};
use crate::types::{
    AdvancedAnalysis, EntryKind, EntryPoint, PatternDirection, ProfitTarget, Reason,
    RecommendationSummary, StopLoss, TradeRecommendation,
};

/// Tunables of the supply/demand strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyDemandParams {
    /// Max distance from a demand zone, as a fraction of price.
    pub zone_proximity: f64,
    /// Zone strength at or above which the zone counts as established.
    pub min_zone_strength: f64,
    /// Stop placement below the zone, as a fraction of the zone price.
    pub stop_below_zone: f64,
    /// Resistance closer than this fraction of price is an overhead obstacle.
    pub overhead_fraction: f64,
    /// Resistance farther than this fraction of price leaves room to run.
    pub headroom_fraction: f64,
    /// Composite score at or above which confluence counts.
    pub confluence_score: f64,
    /// Reward multiples used when no resistance targets exist.
    pub fallback_target_ratios: Vec<f64>,
    /// Resistance levels consumed as profit targets.
    pub max_targets: usize,
}

impl Default for SupplyDemandParams {
    fn default() -> Self {
        Self {
            zone_proximity: 0.015,
            min_zone_strength: 0.5,
            stop_below_zone: 0.008,
            overhead_fraction: 0.01,
            headroom_fraction: 0.03,
            confluence_score: 0.6,
            fallback_target_ratios: vec![1.5, 3.0],
            max_targets: 3,
        }
    }
}

pub struct SupplyDemandStrategy {
    params: SupplyDemandParams,
}

impl SupplyDemandStrategy {
    pub fn new() -> Self {
        Self { params: SupplyDemandParams::default() }
    }

    pub fn with_params(params: SupplyDemandParams) -> Self {
        Self { params }
    }
}

impl Default for SupplyDemandStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for SupplyDemandStrategy {
    fn id(&self) -> &'static str {
        "supply_demand"
    }

    fn name(&self) -> &'static str {
        "Supply / Demand"
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

        let zone = sr.support.first().copied();
        let nearest_resistance = sr.resistance.first().copied();

        let mut score: f64 = 0.0;
        let mut reasons = Vec::new();

        let at_zone = zone
            .map(|z| price > 0.0 && (price - z.price) / price <= p.zone_proximity)
            .unwrap_or(false);
        if let Some(z) = zone {
            if at_zone {
                score += 0.35;
                reasons.push(
                    Reason::new("at_demand_zone").with("zone", format_price(z.price)),
                );
            }
            if z.strength >= p.min_zone_strength {
                score += 0.15;
                reasons.push(
                    Reason::new("zone_established")
                        .with("touches", z.count.to_string())
                        .with("strength", format!("{:.2}", z.strength)),
                );
            }
        }

        match nearest_resistance {
            Some(r) if price > 0.0 => {
                let distance = (r.price - price) / price;
                if distance > p.headroom_fraction {
                    score += 0.2;
                    reasons.push(Reason::new("headroom").with("resistance", format_price(r.price)));
                } else if distance < p.overhead_fraction {
                    score -= 0.2;
                    reasons.push(
                        Reason::new("overhead_resistance").with("resistance", format_price(r.price)),
                    );
                }
            }
            _ => {
                score += 0.2;
                reasons.push(Reason::new("headroom"));
            }
        }

        if has_direction(&patterns, PatternDirection::Bullish) {
            score += 0.15;
            reasons.push(Reason::new("bullish_pattern"));
        }
        if ctx.signal().score >= p.confluence_score {
            score += 0.15;
            reasons.push(
                Reason::new("composite_confluence")
                    .with("score", format!("{:.2}", ctx.signal().score)),
            );
        }

        if reasons.is_empty() {
            reasons.push(Reason::new("no_demand_zone"));
        }

        let confidence = score.clamp(0.0, 1.0);
        let recommendation = TradeRecommendation::from_score(confidence);

        // Stop goes under the zone, not under price: invalidation is the zone
        // breaking, not an arbitrary distance.
        let stop_loss = zone.and_then(|z| {
            if price <= 0.0 {
                return None;
            }
            let stop_price = z.price * (1.0 - p.stop_below_zone);
            let distance = price - stop_price;
            if distance <= 0.0 {
                return None;
            }
            Some(StopLoss { price: stop_price, distance })
        });

        let mut profit_targets: Vec<ProfitTarget> = Vec::new();
        if let Some(stop) = stop_loss {
            profit_targets = sr
                .resistance
                .iter()
                .take(p.max_targets)
                .filter(|r| r.price > price)
                .map(|r| ProfitTarget {
                    price: r.price,
                    ratio: (r.price - price) / stop.distance,
                })
                .collect();
            if profit_targets.is_empty() {
                profit_targets = targets_from_ratios(price, stop.distance, &p.fallback_target_ratios);
            }
        }
        let rr = risk_reward(&profit_targets);

        let mut entry_points = Vec::new();
        if let Some(z) = zone {
            if price > 0.0 {
                entry_points.push(EntryPoint {
                    kind: EntryKind::Limit,
                    price: z.price,
                    confidence: confidence * 0.9,
                    reason: Reason::new("zone_limit").with("zone", format_price(z.price)),
                    level: "support".to_string(),
                    required_confirmation: false,
                });
                if at_zone {
                    entry_points.push(EntryPoint {
                        kind: EntryKind::Market,
                        price,
                        confidence,
                        reason: Reason::new("at_zone_market"),
                        level: "market".to_string(),
                        required_confirmation: !recommendation.is_actionable(),
                    });
                }
            }
        }

        let mut lines = vec![
            format!(
                "{}: {} (confidence {:.0}%)",
                ctx.bundle.symbol,
                recommendation.label(),
                confidence * 100.0
            ),
            format!(
                "Demand zone {}, nearest resistance {}",
                zone.map(|z| format_price(z.price)).unwrap_or_else(|| "none".to_string()),
                nearest_resistance
                    .map(|r| format_price(r.price))
                    .unwrap_or_else(|| "none".to_string())
            ),
        ];
        if let Some(stop) = stop_loss {
            lines.push(format!("Stop {} under the zone", format_price(stop.price)));
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
