//! Omen - deterministic technical analysis and signal scoring for OHLCV candles.
//!
//! The crate turns raw candle history into scored trade signals in three
//! layers: pure indicator math over candle slices, per-timeframe snapshots
//! folded into a weighted composite signal, and pluggable strategies that
//! shape the composite into a full recommendation with stops, targets and
//! entries. A backtest runner replays the same pipeline over historical bars.
//!
//! Everything between input and result is synchronous and deterministic; the
//! async surface is confined to the historical data providers.

pub mod analysis;
pub mod backtest;
pub mod cancel;
pub mod config;
pub mod error;
pub mod strategies;
pub mod types;

// Re-export commonly used types
pub use analysis::{analyze_timeframe, compose_signal, AnalysisEngine};
pub use backtest::{BacktestRunner, HistoricalDataProvider, MemoryDataProvider};
pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use strategies::{Strategy, StrategyContext, StrategyRegistry};
pub use types::*;
