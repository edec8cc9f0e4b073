//! Strategy output types: the advanced per-symbol assessment with entry/exit
//! levels, reasons and the trade recommendation ladder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fine-grained recommendation emitted by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeRecommendation {
    StrongBuy,
    Buy,
    ConditionalBuy,
    Wait,
    Avoid,
}

impl TradeRecommendation {
    /// Map a strategy confidence in [0, 1] to the recommendation ladder.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            TradeRecommendation::StrongBuy
        } else if score >= 0.75 {
            TradeRecommendation::Buy
        } else if score >= 0.60 {
            TradeRecommendation::ConditionalBuy
        } else if score >= 0.40 {
            TradeRecommendation::Wait
        } else {
            TradeRecommendation::Avoid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeRecommendation::StrongBuy => "strong buy",
            TradeRecommendation::Buy => "buy",
            TradeRecommendation::ConditionalBuy => "conditional buy",
            TradeRecommendation::Wait => "wait",
            TradeRecommendation::Avoid => "avoid",
        }
    }

    /// True for the recommendations a backtest may act on.
    pub fn is_actionable(&self) -> bool {
        matches!(self, TradeRecommendation::StrongBuy | TradeRecommendation::Buy)
    }
}

/// A keyed, machine-readable reason with preformatted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    pub key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Reason {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), params: BTreeMap::new() }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Recommendation block of an advanced assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSummary {
    pub recommendation: TradeRecommendation,
    pub confidence_score: f64,
    pub detailed_reasons: Vec<Reason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Sideways => "sideways",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    pub confidence: f64,
}

/// Proposed stop-loss level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLoss {
    pub price: f64,
    /// Distance from the reference entry price, in price units.
    pub distance: f64,
}

/// One profit target with its reward ratio relative to the stop distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitTarget {
    pub price: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReward {
    /// Mean of the profit-target ratios.
    pub average_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Market,
    Limit,
}

/// A proposed entry with its rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub price: f64,
    pub confidence: f64,
    pub reason: Reason,
    /// Which level this entry is anchored to ("market", "support", "ema21", ...).
    pub level: String,
    /// Whether the entry should wait for confirmation before acting.
    pub required_confirmation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternDirection {
    Bullish,
    Bearish,
    Neutral,
}

/// A detected candle pattern on the most recent bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlePattern {
    pub name: String,
    pub direction: PatternDirection,
}

/// A clustered horizontal price level with its touch statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevel {
    pub price: f64,
    /// Normalized touch strength in [0, 1].
    pub strength: f64,
    /// Raw number of pivot touches in the cluster.
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResistance {
    /// Levels below the reference price, nearest first.
    pub support: Vec<PriceLevel>,
    /// Levels above the reference price, nearest first.
    pub resistance: Vec<PriceLevel>,
}

/// Strategy-specific assessment for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedAnalysis {
    pub recommendation: RecommendationSummary,
    pub trend_analysis: TrendAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<StopLoss>,
    pub profit_targets: Vec<ProfitTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<RiskReward>,
    pub entry_points: Vec<EntryPoint>,
    pub candle_patterns: Vec<CandlePattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_resistance: Option<SupportResistance>,
    pub detailed_report: String,
}
