//! Historical candle sources for the backtester.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::types::{Candle, Timeframe};

/// Source of historical candles the backtester replays from.
///
/// Implementations are the only suspension points of a backtest run; the
/// replay itself is synchronous and deterministic.
pub trait HistoricalDataProvider: Send + Sync {
    /// Candles for `symbol` at `timeframe` with open time in
    /// `[start_ms, end_ms)`, ordered by strictly increasing open time.
    ///
    /// An empty vector means the symbol has no data in the range; errors are
    /// reserved for transport or storage failures.
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        timeframe: Timeframe,
        start_ms: i64,
        end_ms: i64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Candle>>> + Send + 'a>>;
}

/// In-memory provider backed by pre-seeded candle series.
///
/// Useful for replaying exported datasets and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataProvider {
    series: HashMap<(String, Timeframe), Vec<Candle>>,
}

impl MemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one series, replacing any previous data for the key. Candles are
    /// sorted by open time on insertion.
    pub fn insert(&mut self, symbol: impl Into<String>, timeframe: Timeframe, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.open_time);
        self.series.insert((symbol.into(), timeframe), candles);
    }
}

impl HistoricalDataProvider for MemoryDataProvider {
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        timeframe: Timeframe,
        start_ms: i64,
        end_ms: i64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Candle>>> + Send + 'a>> {
        Box::pin(async move {
            let candles = self
                .series
                .get(&(symbol.to_string(), timeframe))
                .map(|series| {
                    series
                        .iter()
                        .filter(|c| c.open_time >= start_ms && c.open_time < end_ms)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Ok(candles)
        })
    }
}
