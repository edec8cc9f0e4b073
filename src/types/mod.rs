pub mod analysis;
pub mod backtest;
pub mod candle;
pub mod orderbook;
pub mod strategy;

pub use analysis::*;
pub use backtest::*;
pub use candle::*;
pub use orderbook::*;
pub use strategy::*;
