//! Backtesting engine.
//!
//! Replays daily bars through the analysis pipeline and simulates the trades
//! the selected strategy would have taken: enter at bar close on an
//! actionable recommendation, exit intra-bar at the stop or the first profit
//! target, and force-close whatever is still open on the last bar. A daily
//! bar that crosses both levels is disambiguated against five-minute data;
//! when even that is ambiguous the stop wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisEngine;
use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};
use crate::strategies::Strategy;
use crate::types::{
    BacktestParams, BacktestProgress, BacktestResult, Candle, EquityPoint, SymbolAnalysis,
    SymbolBundle, Timeframe, Trade, TradeExitReason,
};

use super::provider::HistoricalDataProvider;

const MS_PER_YEAR: f64 = 365.0 * 86_400_000.0;

/// One symbol's windowed history, ready to replay.
struct SymbolSeries {
    symbol: String,
    daily: Vec<Candle>,
    hourly: Vec<Candle>,
    four_hour: Vec<Candle>,
}

/// A filled simulated position. The whole balance is committed on entry.
struct OpenPosition {
    entry_date: DateTime<Utc>,
    entry_price: f64,
    quantity: f64,
    stop_loss: f64,
    take_profit: f64,
    entry_analysis: Box<SymbolAnalysis>,
}

/// Mutable run state threaded through the per-symbol replays.
struct ReplayState {
    balance: f64,
    gross_profit: f64,
    gross_loss: f64,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    ambiguous_resolved: u32,
    ambiguous_failed: u32,
}

/// Strategy backtester over a [`HistoricalDataProvider`].
pub struct BacktestRunner {
    engine: Arc<AnalysisEngine>,
    provider: Arc<dyn HistoricalDataProvider>,
    /// Registered runs, id to cancel token.
    running: DashMap<String, CancelToken>,
}

impl BacktestRunner {
    pub fn new(engine: Arc<AnalysisEngine>, provider: Arc<dyn HistoricalDataProvider>) -> Self {
        Self { engine, provider, running: DashMap::new() }
    }

    /// Run a backtest to completion, reporting progress through `on_progress`.
    ///
    /// The run registers itself under a fresh id, visible through
    /// [`BacktestRunner::running_ids`] and cancellable from another task.
    pub async fn run<F>(&self, params: BacktestParams, on_progress: F) -> Result<BacktestResult>
    where
        F: Fn(BacktestProgress) + Send + Sync,
    {
        let run_id = uuid::Uuid::new_v4().to_string();
        let cancel = CancelToken::new();
        self.running.insert(run_id.clone(), cancel.clone());
        info!(
            "Backtest {} started: {} symbols, strategy '{}', {} years",
            run_id,
            params.symbols.len(),
            params.strategy,
            params.time_period_years
        );

        let result = self.replay(&params, &cancel, &on_progress).await;
        self.running.remove(&run_id);

        match &result {
            Ok(report) => info!(
                "Backtest {} completed: {} trades, {:.2}% return",
                run_id, report.total_trades, report.total_return_percent
            ),
            Err(err) if err.is_cancelled() => info!("Backtest {} cancelled", run_id),
            Err(err) => warn!("Backtest {} failed: {}", run_id, err),
        }
        result
    }

    /// Run under a caller-owned cancellation token. The run is not registered
    /// in the shared id table.
    pub async fn run_with_cancel<F>(
        &self,
        params: BacktestParams,
        cancel: &CancelToken,
        on_progress: F,
    ) -> Result<BacktestResult>
    where
        F: Fn(BacktestProgress) + Send + Sync,
    {
        self.replay(&params, cancel, &on_progress).await
    }

    /// Cancel one registered run. Returns whether the id was known.
    pub fn cancel(&self, run_id: &str) -> bool {
        match self.running.get(run_id) {
            Some(entry) => {
                entry.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every registered run.
    pub fn cancel_all(&self) {
        for entry in self.running.iter() {
            entry.value().cancel();
        }
    }

    /// Ids of the currently registered runs.
    pub fn running_ids(&self) -> Vec<String> {
        self.running.iter().map(|entry| entry.key().clone()).collect()
    }

    async fn replay(
        &self,
        params: &BacktestParams,
        cancel: &CancelToken,
        on_progress: &(dyn Fn(BacktestProgress) + Send + Sync),
    ) -> Result<BacktestResult> {
        validate_params(params)?;
        let strategy = self
            .engine
            .registry()
            .resolve(&params.strategy)
            .ok_or_else(|| EngineError::InvalidParams("no strategies registered".to_string()))?;

        let mut state = ReplayState {
            balance: params.initial_capital,
            gross_profit: 0.0,
            gross_loss: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            ambiguous_resolved: 0,
            ambiguous_failed: 0,
        };
        let symbol_count = params.symbols.len();
        let mut replayed_any = false;

        for (symbol_index, symbol) in params.symbols.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            on_progress(BacktestProgress {
                status: "fetching history".to_string(),
                symbol: symbol.clone(),
                progress: symbol_index as f64 / symbol_count as f64,
            });

            let series = match self.fetch_series(symbol, params.time_period_years).await {
                Some(series) => series,
                None => continue,
            };
            replayed_any = true;
            self.replay_symbol(
                &mut state,
                strategy,
                &series,
                cancel,
                on_progress,
                symbol_index,
                symbol_count,
            )
            .await?;
        }

        if !replayed_any {
            return Err(EngineError::NoHistoricalData);
        }

        Ok(summarize(params.clone(), state))
    }

    /// Fetch and window one symbol's history. `None` skips the symbol.
    async fn fetch_series(&self, symbol: &str, years: f64) -> Option<SymbolSeries> {
        let warmup = self.engine.config().backtest.warmup_bars;
        let daily_all = match self
            .provider
            .fetch_candles(symbol, Timeframe::OneDay, 0, i64::MAX)
            .await
        {
            Ok(candles) => candles,
            Err(err) => {
                warn!("Skipping {}: daily history fetch failed: {}", symbol, err);
                return None;
            }
        };
        let end = match daily_all.last() {
            Some(last) => last.open_time,
            None => {
                warn!("Skipping {}: no daily history", symbol);
                return None;
            }
        };

        let start = end - (years * MS_PER_YEAR) as i64;
        let daily: Vec<Candle> = daily_all.into_iter().filter(|c| c.open_time >= start).collect();
        if daily.len() <= warmup {
            warn!(
                "Skipping {}: {} daily bars in the window, warmup needs more than {}",
                symbol,
                daily.len(),
                warmup
            );
            return None;
        }

        let end_exclusive = end + Timeframe::OneDay.duration_ms();
        let hourly = self.fetch_or_empty(symbol, Timeframe::OneHour, start, end_exclusive).await;
        let four_hour = self.fetch_or_empty(symbol, Timeframe::FourHour, start, end_exclusive).await;
        Some(SymbolSeries { symbol: symbol.to_string(), daily, hourly, four_hour })
    }

    async fn fetch_or_empty(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start_ms: i64,
        end_ms: i64,
    ) -> Vec<Candle> {
        match self.provider.fetch_candles(symbol, timeframe, start_ms, end_ms).await {
            Ok(candles) => candles,
            Err(err) => {
                warn!("No {} candles for {}: {}", timeframe, symbol, err);
                Vec::new()
            }
        }
    }

    async fn replay_symbol(
        &self,
        state: &mut ReplayState,
        strategy: &dyn Strategy,
        series: &SymbolSeries,
        cancel: &CancelToken,
        on_progress: &(dyn Fn(BacktestProgress) + Send + Sync),
        symbol_index: usize,
        symbol_count: usize,
    ) -> Result<()> {
        let warmup = self.engine.config().backtest.warmup_bars;
        let daily = &series.daily;
        let replayed_bars = (daily.len() - warmup) as f64;

        let mut open: Option<OpenPosition> = None;

        for i in warmup..daily.len() {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            // Cooperative yield; a full replay can otherwise hold the
            // executor for seconds when the provider never suspends.
            tokio::task::yield_now().await;

            let bar = &daily[i];
            on_progress(BacktestProgress {
                status: "replaying".to_string(),
                symbol: series.symbol.clone(),
                progress: (symbol_index as f64 + (i - warmup) as f64 / replayed_bars)
                    / symbol_count as f64,
            });

            let last_bar = i == daily.len() - 1;
            let post_exit_price = daily.get(i + 1).map(|c| c.close);

            // Exits are evaluated before any new entry on the same bar.
            if let Some(position) = open.take() {
                let stop_hit = bar.low <= position.stop_loss;
                let target_hit = bar.high >= position.take_profit;
                let exit = match (stop_hit, target_hit) {
                    (true, true) => {
                        match self
                            .resolve_ambiguous_bar(
                                &series.symbol,
                                bar,
                                position.stop_loss,
                                position.take_profit,
                            )
                            .await
                        {
                            Some(reason) => {
                                state.ambiguous_resolved += 1;
                                Some(reason)
                            }
                            None => {
                                state.ambiguous_failed += 1;
                                Some(TradeExitReason::StopLoss)
                            }
                        }
                    }
                    (true, false) => Some(TradeExitReason::StopLoss),
                    (false, true) => Some(TradeExitReason::Target),
                    (false, false) => None,
                };
                match exit {
                    Some(reason) => {
                        let exit_price = match reason {
                            TradeExitReason::StopLoss => position.stop_loss,
                            TradeExitReason::Target => position.take_profit,
                            TradeExitReason::End => bar.close,
                        };
                        close_position(
                            state,
                            &series.symbol,
                            position,
                            exit_price,
                            bar.open_datetime(),
                            reason,
                            post_exit_price,
                        );
                    }
                    None if last_bar => {
                        close_position(
                            state,
                            &series.symbol,
                            position,
                            bar.close,
                            bar.open_datetime(),
                            TradeExitReason::End,
                            None,
                        );
                    }
                    None => open = Some(position),
                }
            }

            // Entries fill at the decision bar's close; never on the final bar.
            if open.is_none() && !last_bar && bar.close > 0.0 {
                match self.engine.analyze_symbol(&self.decision_bundle(series, i), strategy) {
                    Ok(analysis) => {
                        let actionable =
                            analysis.advanced.recommendation.recommendation.is_actionable();
                        let plan = analysis
                            .advanced
                            .stop_loss
                            .zip(analysis.advanced.profit_targets.first().copied());
                        if actionable {
                            if let Some((stop, target)) = plan {
                                if stop.price < bar.close && target.price > bar.close {
                                    open = Some(OpenPosition {
                                        entry_date: bar.open_datetime(),
                                        entry_price: bar.close,
                                        quantity: state.balance / bar.close,
                                        stop_loss: stop.price,
                                        take_profit: target.price,
                                        entry_analysis: Box::new(analysis),
                                    });
                                }
                            }
                        }
                    }
                    Err(err) => {
                        debug!("Analysis failed for {} at bar {}: {}", series.symbol, i, err);
                    }
                }
            }

            let equity = match &open {
                Some(position) => position.quantity * bar.close,
                None => state.balance,
            };
            state.equity_curve.push(EquityPoint { date: bar.open_datetime(), balance: equity });
        }

        Ok(())
    }

    /// Analysis input as it would have looked at the close of `daily[index]`.
    fn decision_bundle(&self, series: &SymbolSeries, index: usize) -> SymbolBundle {
        let tuning = &self.engine.config().backtest;
        let bar = &series.daily[index];
        let known_until = bar.open_time + Timeframe::OneDay.duration_ms();
        let change_24h = if index > 0 && series.daily[index - 1].close > 0.0 {
            (bar.close / series.daily[index - 1].close - 1.0) * 100.0
        } else {
            0.0
        };
        SymbolBundle {
            symbol: series.symbol.clone(),
            current_price: bar.close,
            change_24h,
            volume_24h: bar.volume,
            candles_1h: tail_window(&series.hourly, known_until, tuning.window_1h),
            candles_4h: tail_window(&series.four_hour, known_until, tuning.window_4h),
            candles_1d: tail_window(&series.daily, known_until, tuning.window_1d),
            order_book: None,
        }
    }

    /// Decide which side of a both-levels bar was hit first by walking its
    /// five-minute candles. `None` means the order stays unknown.
    async fn resolve_ambiguous_bar(
        &self,
        symbol: &str,
        bar: &Candle,
        stop: f64,
        target: f64,
    ) -> Option<TradeExitReason> {
        let end = bar.open_time + Timeframe::OneDay.duration_ms();
        let fine = match self
            .provider
            .fetch_candles(symbol, Timeframe::FiveMinute, bar.open_time, end)
            .await
        {
            Ok(candles) => candles,
            Err(err) => {
                debug!("5m disambiguation fetch failed for {}: {}", symbol, err);
                Vec::new()
            }
        };
        for candle in &fine {
            let stop_hit = candle.low <= stop;
            let target_hit = candle.high >= target;
            match (stop_hit, target_hit) {
                (true, true) => return None,
                (true, false) => return Some(TradeExitReason::StopLoss),
                (false, true) => return Some(TradeExitReason::Target),
                (false, false) => {}
            }
        }
        None
    }
}

fn validate_params(params: &BacktestParams) -> Result<()> {
    if params.symbols.is_empty() {
        return Err(EngineError::InvalidParams("no symbols requested".to_string()));
    }
    if params.time_period_years <= 0.0 || !params.time_period_years.is_finite() {
        return Err(EngineError::InvalidParams(
            "time period must be a positive number of years".to_string(),
        ));
    }
    if params.initial_capital <= 0.0 || !params.initial_capital.is_finite() {
        return Err(EngineError::InvalidParams("initial capital must be positive".to_string()));
    }
    Ok(())
}

/// Last `keep` candles opening strictly before `end_ms`.
fn tail_window(candles: &[Candle], end_ms: i64, keep: usize) -> Vec<Candle> {
    let upto = candles.partition_point(|c| c.open_time < end_ms);
    let start = upto.saturating_sub(keep);
    candles[start..upto].to_vec()
}

fn close_position(
    state: &mut ReplayState,
    symbol: &str,
    position: OpenPosition,
    exit_price: f64,
    exit_date: DateTime<Utc>,
    reason: TradeExitReason,
    post_exit_price: Option<f64>,
) {
    let pnl = position.quantity * (exit_price - position.entry_price);
    state.balance = position.quantity * exit_price;
    if pnl > 0.0 {
        state.gross_profit += pnl;
    } else {
        state.gross_loss += -pnl;
    }
    debug!(
        "Closed {} @ {:.4} ({:?}, P&L {:.2})",
        symbol, exit_price, reason, pnl
    );
    state.trades.push(Trade {
        symbol: symbol.to_string(),
        entry_date: position.entry_date,
        entry_price: position.entry_price,
        exit_date,
        exit_price,
        profit_percent: (exit_price / position.entry_price - 1.0) * 100.0,
        reason,
        stop_loss: position.stop_loss,
        take_profit: position.take_profit,
        entry_analysis: position.entry_analysis,
        post_exit_price,
    });
}

fn summarize(params: BacktestParams, state: ReplayState) -> BacktestResult {
    let total_trades = state.trades.len() as u32;
    let winning_trades = state.trades.iter().filter(|t| t.profit_percent > 0.0).count() as u32;
    let losing_trades = total_trades - winning_trades;
    let win_rate = if total_trades > 0 {
        winning_trades as f64 / total_trades as f64
    } else {
        0.0
    };
    let profit_factor = if state.gross_loss > 0.0 {
        state.gross_profit / state.gross_loss
    } else if state.gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let mut peak = params.initial_capital;
    let mut max_drawdown = 0.0f64;
    for point in &state.equity_curve {
        if point.balance > peak {
            peak = point.balance;
        }
        if peak > 0.0 {
            let drawdown = (peak - point.balance) / peak * 100.0;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    let final_balance = state.balance;
    let total_return_percent = (final_balance / params.initial_capital - 1.0) * 100.0;

    BacktestResult {
        params,
        final_balance,
        total_return_percent,
        total_trades,
        winning_trades,
        losing_trades,
        win_rate,
        profit_factor,
        max_drawdown,
        equity_curve: state.equity_curve,
        trades: state.trades,
        ambiguous_trades_resolved: state.ambiguous_resolved,
        ambiguous_trades_failed: state.ambiguous_failed,
    }
}
