//! Backtest parameter, trade and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SymbolAnalysis;

/// Parameters of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestParams {
    pub symbols: Vec<String>,
    /// Strategy id; unknown names fall back to the balanced strategy.
    pub strategy: String,
    /// Length of the replay window in years, counted back from the end of the
    /// available history.
    pub time_period_years: f64,
    pub initial_capital: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            strategy: "main_balanced".to_string(),
            time_period_years: 1.0,
            initial_capital: 10_000.0,
        }
    }
}

/// Why a simulated trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeExitReason {
    Target,
    StopLoss,
    End,
}

/// One closed simulated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub entry_date: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_date: DateTime<Utc>,
    pub exit_price: f64,
    pub profit_percent: f64,
    pub reason: TradeExitReason,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Full analysis snapshot that triggered the entry.
    pub entry_analysis: Box<SymbolAnalysis>,
    /// Close of the bar after the exit bar, for post-trade review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_exit_price: Option<f64>,
}

/// One point of the running-balance curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: DateTime<Utc>,
    pub balance: f64,
}

/// Aggregate statistics over all trades of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub params: BacktestParams,
    pub final_balance: f64,
    pub total_return_percent: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// winning / total, as a plain ratio in [0, 1].
    pub win_rate: f64,
    /// Gross profit / gross loss; infinite when there are gains and no losses.
    pub profit_factor: f64,
    /// Largest peak-to-trough decline of the equity curve, in percent.
    pub max_drawdown: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub ambiguous_trades_resolved: u32,
    pub ambiguous_trades_failed: u32,
}

/// Progress callback payload, one per unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestProgress {
    pub status: String,
    pub symbol: String,
    /// Completed fraction of the whole run in [0, 1].
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = BacktestParams::default();
        assert_eq!(params.strategy, "main_balanced");
        assert_eq!(params.initial_capital, 10_000.0);
        assert_eq!(params.time_period_years, 1.0);
    }

    #[test]
    fn test_exit_reason_wire_names() {
        assert_eq!(serde_json::to_string(&TradeExitReason::Target).unwrap(), "\"target\"");
        assert_eq!(serde_json::to_string(&TradeExitReason::StopLoss).unwrap(), "\"stop-loss\"");
        assert_eq!(serde_json::to_string(&TradeExitReason::End).unwrap(), "\"end\"");
    }
}
