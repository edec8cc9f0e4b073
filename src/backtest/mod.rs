//! Historical replay of the analysis pipeline: a data-provider seam plus a
//! deterministic bar-by-bar simulator.

pub mod provider;
pub mod runner;

pub use provider::{HistoricalDataProvider, MemoryDataProvider};
pub use runner::BacktestRunner;
