//! Batch analysis pipeline.
//!
//! [`AnalysisEngine`] ties the per-timeframe analyzer, the signal composer and
//! a strategy together: validate each bundle, analyze its three timeframes,
//! compose the weighted signal, run the selected strategy, then flag relative
//! metrics across the batch. Per-symbol failures become failure records and
//! never abort the batch.

use std::cmp::Ordering;

use tracing::warn;

use crate::analysis::composer::compose_signal;
use crate::analysis::timeframe::analyze_timeframe;
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{BundleError, EngineError, Result};
use crate::strategies::{Strategy, StrategyContext, StrategyRegistry};
use crate::types::{AnalysisRecord, BaseAnalysis, SymbolAnalysis, SymbolBundle, Timeframe, TimeframeSet};

/// Deterministic analysis engine over pre-fetched candle bundles.
pub struct AnalysisEngine {
    config: EngineConfig,
    registry: StrategyRegistry,
}

impl AnalysisEngine {
    /// Engine with the default strategy set.
    pub fn new(config: EngineConfig) -> Self {
        Self { config, registry: StrategyRegistry::with_defaults() }
    }

    /// Engine with a caller-assembled strategy set.
    pub fn with_registry(config: EngineConfig, registry: StrategyRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Full single-symbol analysis with an explicit strategy.
    ///
    /// `is_high_volume` is left `false` here; it is a batch-relative metric
    /// applied by [`AnalysisEngine::run_full_analysis`].
    pub fn analyze_symbol(
        &self,
        bundle: &SymbolBundle,
        strategy: &dyn Strategy,
    ) -> Result<SymbolAnalysis> {
        validate_bundle(bundle)?;

        let timeframes = TimeframeSet {
            one_hour: analyze_timeframe(&bundle.candles_1h, &self.config),
            four_hour: analyze_timeframe(&bundle.candles_4h, &self.config),
            daily: analyze_timeframe(&bundle.candles_1d, &self.config),
        };
        let signal = compose_signal(
            &timeframes.one_hour,
            &timeframes.four_hour,
            &timeframes.daily,
            bundle.order_book.as_ref(),
            &self.config,
        );
        let base = BaseAnalysis { timeframes, signal };

        let ctx = StrategyContext::new(bundle, &base, &self.config);
        let advanced = strategy.evaluate(&ctx);

        Ok(SymbolAnalysis {
            symbol: bundle.symbol.clone(),
            current_price: bundle.current_price,
            change_24h: bundle.change_24h,
            volume_24h: bundle.volume_24h,
            is_high_volume: false,
            analysis: base,
            advanced,
        })
    }

    /// Analyze a batch of bundles with the named strategy.
    pub fn run_full_analysis(
        &self,
        bundles: &[SymbolBundle],
        strategy_id: &str,
    ) -> Result<Vec<AnalysisRecord>> {
        self.run_full_analysis_cancellable(bundles, strategy_id, &CancelToken::new())
    }

    /// Batch analysis that honors a cancellation token between symbols.
    pub fn run_full_analysis_cancellable(
        &self,
        bundles: &[SymbolBundle],
        strategy_id: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<AnalysisRecord>> {
        let strategy = self
            .registry
            .resolve(strategy_id)
            .ok_or_else(|| EngineError::InvalidParams("no strategies registered".to_string()))?;

        let mut records = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            match self.analyze_symbol(bundle, strategy) {
                Ok(analysis) => records.push(AnalysisRecord::Ready(Box::new(analysis))),
                Err(err) => {
                    warn!("Analysis failed for {}: {}", bundle.symbol, err);
                    records.push(AnalysisRecord::Failed {
                        symbol: bundle.symbol.clone(),
                        analysis_error: err.to_string(),
                    });
                }
            }
        }

        if !bundles.is_empty() && !records.iter().any(AnalysisRecord::is_ready) {
            return Err(EngineError::NoUsableData { attempted: bundles.len() });
        }

        apply_relative_metrics(&mut records);
        Ok(records)
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Reject bundles the analyzers cannot interpret deterministically.
fn validate_bundle(bundle: &SymbolBundle) -> std::result::Result<(), BundleError> {
    if !bundle.current_price.is_finite() {
        return Err(BundleError::NonFinitePrice);
    }
    for (timeframe, candles) in [
        (Timeframe::OneHour, &bundle.candles_1h),
        (Timeframe::FourHour, &bundle.candles_4h),
        (Timeframe::OneDay, &bundle.candles_1d),
    ] {
        if candles.windows(2).any(|pair| pair[1].open_time <= pair[0].open_time) {
            return Err(BundleError::UnorderedCandles { timeframe });
        }
        if candles.iter().any(|candle| !candle.is_finite()) {
            return Err(BundleError::NonFiniteCandles { timeframe });
        }
    }
    Ok(())
}

/// Flag records whose 24h volume is strictly above the batch's upper-quartile
/// volume. Failed records carry no metrics and are skipped.
fn apply_relative_metrics(records: &mut [AnalysisRecord]) {
    let mut volumes: Vec<f64> = records
        .iter()
        .filter_map(AnalysisRecord::ready)
        .map(|analysis| analysis.volume_24h)
        .collect();
    if volumes.is_empty() {
        return;
    }
    volumes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let q3 = volumes[(volumes.len() as f64 * 0.75).floor() as usize];

    for record in records.iter_mut() {
        if let AnalysisRecord::Ready(analysis) = record {
            analysis.is_high_volume = analysis.volume_24h > q3;
        }
    }
}
