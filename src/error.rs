use thiserror::Error;

use crate::types::Timeframe;

/// Rejection of a per-symbol candle bundle before analysis.
///
/// These become per-item failure records in a batch; they never abort it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    #[error("candles for {timeframe} are not strictly ordered by open time")]
    UnorderedCandles { timeframe: Timeframe },

    #[error("candles for {timeframe} contain non-finite values")]
    NonFiniteCandles { timeframe: Timeframe },

    #[error("current price is not finite")]
    NonFinitePrice,
}

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Every symbol of a non-empty batch failed to produce a usable record.
    #[error("no symbols produced usable analysis data ({attempted} attempted)")]
    NoUsableData { attempted: usize },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// None of the requested symbols had replayable history.
    #[error("no historical data available for any requested symbol")]
    NoHistoricalData,

    /// Cooperative cancellation. Not a failure; drivers should check
    /// [`EngineError::is_cancelled`] before reporting an error.
    #[error("run was cancelled")]
    Cancelled,

    #[error(transparent)]
    InvalidBundle(#[from] BundleError),

    #[error(transparent)]
    DataSource(#[from] anyhow::Error),
}

impl EngineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
