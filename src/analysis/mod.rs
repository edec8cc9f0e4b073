//! The deterministic analysis core: indicator math, per-timeframe snapshots,
//! the weighted signal composer and the batch pipeline.

pub mod composer;
pub mod indicators;
pub mod pipeline;
pub mod timeframe;

pub use composer::compose_signal;
pub use pipeline::AnalysisEngine;
pub use timeframe::analyze_timeframe;
