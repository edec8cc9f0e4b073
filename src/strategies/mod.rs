//! Pluggable strategy modules.
//!
//! Each strategy is an independent scoring policy over the same base
//! analysis: it classifies a fine-grained recommendation, proposes entries,
//! a stop-loss and profit targets, and writes a short report. Strategies are
//! selected by id through [`StrategyRegistry`]; unknown ids fall back to the
//! balanced default with a logged warning.

pub mod balanced;
pub mod context;
pub mod levels;
pub mod mean_reversion;
pub mod momentum_breakout;
pub mod patterns;
pub mod supply_demand;

#[cfg(test)]
pub(crate) mod testutil;

pub use balanced::{BalancedParams, BalancedStrategy};
pub use context::StrategyContext;
pub use levels::detect_levels;
pub use mean_reversion::{MeanReversionParams, MeanReversionStrategy};
pub use momentum_breakout::{MomentumBreakoutParams, MomentumBreakoutStrategy};
pub use patterns::detect_patterns;
pub use supply_demand::{SupplyDemandParams, SupplyDemandStrategy};

use std::collections::BTreeMap;

use tracing::warn;

use crate::types::{
    AdvancedAnalysis, ProfitTarget, Reason, RecommendationSummary, RiskReward,
    TradeRecommendation, TrendAnalysis, TrendDirection,
};

/// Id of the strategy used when an unknown id is requested.
pub const DEFAULT_STRATEGY: &str = "main_balanced";

/// A single scoring policy. Implementations are pure: the same context always
/// produces the same assessment.
pub trait Strategy: Send + Sync {
    /// Stable identifier used for registry lookup.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Produce the advanced assessment for one symbol.
    fn evaluate(&self, ctx: &StrategyContext<'_>) -> AdvancedAnalysis;
}

/// Registry mapping strategy ids to implementations.
pub struct StrategyRegistry {
    strategies: BTreeMap<&'static str, Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self { strategies: BTreeMap::new() }
    }

    /// Registry with the four built-in strategies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(BalancedStrategy::new()));
        registry.register(Box::new(MeanReversionStrategy::new()));
        registry.register(Box::new(MomentumBreakoutStrategy::new()));
        registry.register(Box::new(SupplyDemandStrategy::new()));
        registry
    }

    /// Register a strategy under its own id, replacing any previous entry.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.insert(strategy.id(), strategy);
    }

    /// Exact lookup by id.
    pub fn get(&self, id: &str) -> Option<&dyn Strategy> {
        self.strategies.get(id).map(|s| s.as_ref())
    }

    /// Resolve an id with the documented fallback chain: exact match, then
    /// the balanced default with a logged warning, then any registered
    /// strategy. Returns `None` only when the registry is empty.
    pub fn resolve(&self, id: &str) -> Option<&dyn Strategy> {
        if let Some(strategy) = self.get(id) {
            return Some(strategy);
        }
        warn!("Unknown strategy '{}', falling back to '{}'", id, DEFAULT_STRATEGY);
        if let Some(strategy) = self.get(DEFAULT_STRATEGY) {
            return Some(strategy);
        }
        self.strategies.values().next().map(|s| s.as_ref())
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.strategies.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Trend classification shared by the strategies: direction from the
/// strongest available timeframe's trend strength with a sideways band at
/// ±0.2, confidence blended from strength magnitude and ADX.
pub(crate) fn trend_analysis(ctx: &StrategyContext<'_>) -> TrendAnalysis {
    let snapshot = ctx
        .daily()
        .or_else(|| ctx.four_hour())
        .or_else(|| ctx.one_hour());

    match snapshot {
        Some(s) => {
            let strength = s.trend_strength;
            let direction = if strength > 0.2 {
                TrendDirection::Up
            } else if strength < -0.2 {
                TrendDirection::Down
            } else {
                TrendDirection::Sideways
            };
            let adx_term = s.adx.map(|a| (a / 50.0).min(1.0)).unwrap_or(0.0);
            let confidence = ((strength.abs() + adx_term) / 2.0).clamp(0.0, 1.0);
            TrendAnalysis { direction, confidence }
        }
        None => TrendAnalysis { direction: TrendDirection::Sideways, confidence: 0.0 },
    }
}

/// Profit targets above `entry` at R multiples of the stop distance.
pub(crate) fn targets_from_ratios(
    entry: f64,
    stop_distance: f64,
    ratios: &[f64],
) -> Vec<ProfitTarget> {
    ratios
        .iter()
        .map(|&ratio| ProfitTarget { price: entry + stop_distance * ratio, ratio })
        .collect()
}

/// Average target ratio, `None` for an empty target list.
pub(crate) fn risk_reward(targets: &[ProfitTarget]) -> Option<RiskReward> {
    if targets.is_empty() {
        return None;
    }
    let sum: f64 = targets.iter().map(|t| t.ratio).sum();
    Some(RiskReward { average_ratio: sum / targets.len() as f64 })
}

/// Price formatting for report text. Sub-unit prices keep more decimals.
pub(crate) fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.6}", price)
    }
}

/// Assessment for a symbol none of whose timeframes could be analyzed: wait,
/// zero confidence, no levels.
pub(crate) fn insufficient_output(symbol: &str) -> AdvancedAnalysis {
    AdvancedAnalysis {
        recommendation: RecommendationSummary {
            recommendation: TradeRecommendation::Wait,
            confidence_score: 0.0,
            detailed_reasons: vec![Reason::new("insufficient_data")],
        },
        trend_analysis: TrendAnalysis { direction: TrendDirection::Sideways, confidence: 0.0 },
        stop_loss: None,
        profit_targets: Vec::new(),
        risk_reward: None,
        entry_points: Vec::new(),
        candle_patterns: Vec::new(),
        support_resistance: None,
        detailed_report: format!("{}: not enough candle history to analyze.", symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_four_strategies() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.ids(),
            vec!["main_balanced", "mean_reversion", "momentum_breakout", "supply_demand"]
        );
    }

    #[test]
    fn test_exact_lookup() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.get("mean_reversion").map(|s| s.id()), Some("mean_reversion"));
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_balanced() {
        let registry = StrategyRegistry::with_defaults();
        let strategy = registry.resolve("does_not_exist").unwrap();
        assert_eq!(strategy.id(), DEFAULT_STRATEGY);
    }

    #[test]
    fn test_resolve_on_empty_registry() {
        let registry = StrategyRegistry::new();
        assert!(registry.resolve("main_balanced").is_none());
    }

    #[test]
    fn test_resolve_without_default_picks_any() {
        let mut registry = StrategyRegistry::new();
        registry.register(Box::new(MeanReversionStrategy::new()));
        let strategy = registry.resolve("does_not_exist").unwrap();
        assert_eq!(strategy.id(), "mean_reversion");
    }

    #[test]
    fn test_targets_and_risk_reward() {
        let targets = targets_from_ratios(100.0, 2.0, &[1.5, 2.5, 4.0]);
        assert_eq!(targets.len(), 3);
        assert!((targets[0].price - 103.0).abs() < 1e-12);
        assert!((targets[2].price - 108.0).abs() < 1e-12);

        let rr = risk_reward(&targets).unwrap();
        assert!((rr.average_ratio - 8.0 / 3.0).abs() < 1e-12);

        assert!(risk_reward(&[]).is_none());
    }

    #[test]
    fn test_format_price_precision() {
        assert_eq!(format_price(42123.456), "42123.46");
        assert_eq!(format_price(0.00012345), "0.000123");
    }
}
