//! Analysis value objects: per-timeframe indicator snapshots, the composite
//! signal, and the per-symbol batch records.
//!
//! Everything here is a plain serializable value produced by a pure
//! transformation chain. Period-keyed maps are `BTreeMap` so that serialized
//! output is byte-identical across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AdvancedAnalysis, Candle, OrderBookSnapshot};

/// Last MACD line, signal line and histogram values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub hist: f64,
}

/// Last smoothed %K and %D stochastic values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
}

/// Last Bollinger band values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerReading {
    pub mid: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Read-only snapshot of the full indicator set for one timeframe.
///
/// Every value is the *last* element of its computed series; a `None` marks an
/// indicator whose minimum input length was not met. `trend_strength` is the
/// signed [-1, 1] heuristic described in the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeSnapshot {
    /// Last close of the analyzed series.
    pub price: f64,
    pub ema: BTreeMap<u32, Option<f64>>,
    pub sma: BTreeMap<u32, Option<f64>>,
    pub rsi: BTreeMap<u32, Option<f64>>,
    pub macd: Option<MacdReading>,
    pub stochastic: Option<StochasticReading>,
    pub willr: Option<f64>,
    pub bb: Option<BollingerReading>,
    pub atr: Option<f64>,
    pub obv: Option<f64>,
    pub mfi: Option<f64>,
    pub vwap: Option<f64>,
    pub adx: Option<f64>,
    pub trend_strength: f64,
}

impl TimeframeSnapshot {
    /// EMA value for `period`, flattening the missing-period and
    /// insufficient-data cases.
    pub fn ema_value(&self, period: u32) -> Option<f64> {
        self.ema.get(&period).copied().flatten()
    }

    pub fn sma_value(&self, period: u32) -> Option<f64> {
        self.sma.get(&period).copied().flatten()
    }

    pub fn rsi_value(&self, period: u32) -> Option<f64> {
        self.rsi.get(&period).copied().flatten()
    }

    /// MACD histogram, if the MACD could be computed.
    pub fn macd_hist(&self) -> Option<f64> {
        self.macd.map(|m| m.hist)
    }
}

/// Result of analyzing one timeframe: either a full snapshot or the explicit
/// insufficient-data marker. The marker is a degraded state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeOutcome {
    Ready(TimeframeSnapshot),
    InsufficientData,
}

impl TimeframeOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, TimeframeOutcome::Ready(_))
    }

    /// Snapshot reference when this outcome is ready.
    pub fn ready(&self) -> Option<&TimeframeSnapshot> {
        match self {
            TimeframeOutcome::Ready(snapshot) => Some(snapshot),
            TimeframeOutcome::InsufficientData => None,
        }
    }
}

/// The five weighted sub-scores of the composite signal, each nominally in
/// [0, 1]. The volatility flag can dip below zero in the 4-5% ATR/price band;
/// the final score clamp absorbs that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalFlags {
    pub trend_flag: f64,
    pub momentum_flag: f64,
    pub volume_flag: f64,
    pub orderbook_flag: f64,
    pub volatility_flag: f64,
}

/// Coarse recommendation derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalVerdict {
    Buy,
    Conditional,
    Wait,
}

impl SignalVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            SignalVerdict::Buy => "buy",
            SignalVerdict::Conditional => "conditional",
            SignalVerdict::Wait => "wait",
        }
    }
}

/// Weighted multi-factor signal for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSignal {
    pub flags: SignalFlags,
    /// Weighted sum of the flags, clamped to [0, 1].
    pub score: f64,
    pub recommendation: SignalVerdict,
}

/// Per-symbol input bundle delivered by the data-fetch collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolBundle {
    pub symbol: String,
    pub current_price: f64,
    #[serde(default)]
    pub change_24h: f64,
    #[serde(default)]
    pub volume_24h: f64,
    #[serde(default)]
    pub candles_1h: Vec<Candle>,
    #[serde(default)]
    pub candles_4h: Vec<Candle>,
    #[serde(default)]
    pub candles_1d: Vec<Candle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_book: Option<OrderBookSnapshot>,
}

/// Outcomes for the three analyzed timeframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSet {
    #[serde(rename = "1h")]
    pub one_hour: TimeframeOutcome,
    #[serde(rename = "4h")]
    pub four_hour: TimeframeOutcome,
    #[serde(rename = "1d")]
    pub daily: TimeframeOutcome,
}

/// Multi-timeframe analysis plus the composite signal for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseAnalysis {
    pub timeframes: TimeframeSet,
    pub signal: CompositeSignal,
}

/// Complete per-symbol analysis: base pipeline output plus the selected
/// strategy's advanced assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub current_price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    /// Set by the batch post-pass: 24h volume strictly above the batch's
    /// upper-quartile volume.
    pub is_high_volume: bool,
    pub analysis: BaseAnalysis,
    pub advanced: AdvancedAnalysis,
}

/// One item of a batch analysis: a full record, or the per-symbol failure
/// marker. Failures never abort the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisRecord {
    Ready(Box<SymbolAnalysis>),
    #[serde(rename_all = "camelCase")]
    Failed {
        symbol: String,
        analysis_error: String,
    },
}

impl AnalysisRecord {
    pub fn symbol(&self) -> &str {
        match self {
            AnalysisRecord::Ready(analysis) => &analysis.symbol,
            AnalysisRecord::Failed { symbol, .. } => symbol,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AnalysisRecord::Ready(_))
    }

    pub fn ready(&self) -> Option<&SymbolAnalysis> {
        match self {
            AnalysisRecord::Ready(analysis) => Some(analysis),
            AnalysisRecord::Failed { .. } => None,
        }
    }

    /// Error message for failed records.
    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisRecord::Ready(_) => None,
            AnalysisRecord::Failed { analysis_error, .. } => Some(analysis_error),
        }
    }
}
