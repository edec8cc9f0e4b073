//! Read-only view handed to a strategy for one symbol.

use crate::config::EngineConfig;
use crate::types::{
    BaseAnalysis, Candle, CompositeSignal, SymbolBundle, TimeframeSnapshot,
};

/// Everything a strategy may read when evaluating one symbol: the raw candle
/// bundle, the finished base analysis and the engine configuration. Strategies
/// never mutate any of it.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    pub bundle: &'a SymbolBundle,
    pub base: &'a BaseAnalysis,
    pub config: &'a EngineConfig,
}

impl<'a> StrategyContext<'a> {
    pub fn new(bundle: &'a SymbolBundle, base: &'a BaseAnalysis, config: &'a EngineConfig) -> Self {
        Self { bundle, base, config }
    }

    pub fn one_hour(&self) -> Option<&'a TimeframeSnapshot> {
        self.base.timeframes.one_hour.ready()
    }

    pub fn four_hour(&self) -> Option<&'a TimeframeSnapshot> {
        self.base.timeframes.four_hour.ready()
    }

    pub fn daily(&self) -> Option<&'a TimeframeSnapshot> {
        self.base.timeframes.daily.ready()
    }

    pub fn signal(&self) -> &'a CompositeSignal {
        &self.base.signal
    }

    /// True when at least one timeframe produced a snapshot.
    pub fn has_any_timeframe(&self) -> bool {
        self.one_hour().is_some() || self.four_hour().is_some() || self.daily().is_some()
    }

    /// Reference price: the bundle's live price, or the freshest analyzed
    /// close when the bundle price is missing.
    pub fn price(&self) -> f64 {
        if self.bundle.current_price != 0.0 {
            return self.bundle.current_price;
        }
        self.one_hour()
            .or_else(|| self.four_hour())
            .or_else(|| self.daily())
            .map(|s| s.price)
            .unwrap_or(0.0)
    }

    /// ATR from the finest timeframe that has one.
    pub fn atr(&self) -> Option<f64> {
        self.one_hour()
            .and_then(|s| s.atr)
            .or_else(|| self.four_hour().and_then(|s| s.atr))
            .or_else(|| self.daily().and_then(|s| s.atr))
    }

    /// Candles used for support/resistance detection. Coarser series carry
    /// the more significant swing levels, so daily wins when present.
    pub fn level_candles(&self) -> &'a [Candle] {
        if !self.bundle.candles_1d.is_empty() {
            &self.bundle.candles_1d
        } else if !self.bundle.candles_4h.is_empty() {
            &self.bundle.candles_4h
        } else {
            &self.bundle.candles_1h
        }
    }

    /// Candles used for candle-pattern detection, finest first.
    pub fn pattern_candles(&self) -> &'a [Candle] {
        if !self.bundle.candles_1h.is_empty() {
            &self.bundle.candles_1h
        } else if !self.bundle.candles_4h.is_empty() {
            &self.bundle.candles_4h
        } else {
            &self.bundle.candles_1d
        }
    }
}
