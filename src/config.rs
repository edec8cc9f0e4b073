use std::env;

/// Stochastic oscillator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticParams {
    pub k_period: usize,
    pub d_period: usize,
    pub smooth_k: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self { k_period: 14, d_period: 3, smooth_k: 3 }
    }
}

/// MACD parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9 }
    }
}

/// Bollinger band parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerParams {
    pub period: usize,
    pub std_devs: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self { period: 20, std_devs: 2.0 }
    }
}

/// Ichimoku periods. Defined for forward-compatibility; the current scoring
/// does not read them.
#[derive(Debug, Clone, PartialEq)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self { tenkan: 9, kijun: 26, senkou_b: 52 }
    }
}

/// The fixed indicator parameter table used by the timeframe analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    /// EMA periods computed per timeframe. Trend strength reads 21 and 50.
    pub ema_periods: Vec<u32>,
    pub sma_periods: Vec<u32>,
    /// RSI periods. Momentum scoring reads 14.
    pub rsi_periods: Vec<u32>,
    pub stochastic: StochasticParams,
    pub macd: MacdParams,
    pub bollinger: BollingerParams,
    pub willr_period: usize,
    pub atr_period: usize,
    pub mfi_period: usize,
    pub adx_period: usize,
    pub ichimoku: IchimokuParams,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_periods: vec![9, 21, 50],
            sma_periods: vec![50, 200],
            rsi_periods: vec![14, 7, 21],
            stochastic: StochasticParams::default(),
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
            willr_period: 14,
            atr_period: 14,
            mfi_period: 14,
            adx_period: 14,
            ichimoku: IchimokuParams::default(),
        }
    }
}

/// Weights of the five composite-signal flags. Must sum to 1 for the score to
/// span [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub trend: f64,
    pub momentum: f64,
    pub volume: f64,
    pub orderbook: f64,
    pub volatility: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trend: 0.30,
            momentum: 0.25,
            volume: 0.20,
            orderbook: 0.15,
            volatility: 0.10,
        }
    }
}

/// Composite-score cutoffs for the coarse recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    /// Score at or above this maps to 'buy'.
    pub buy: f64,
    /// Score at or above this (and below `buy`) maps to 'conditional'.
    pub conditional: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self { buy: 0.75, conditional: 0.60 }
    }
}

/// Replay tuning for the backtest engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestTuning {
    /// Daily bars consumed before the first entry decision.
    pub warmup_bars: usize,
    /// Maximum 1h candles handed to the analyzer per bar.
    pub window_1h: usize,
    /// Maximum 4h candles handed to the analyzer per bar.
    pub window_4h: usize,
    /// Maximum daily candles handed to the analyzer per bar.
    pub window_1d: usize,
}

impl Default for BacktestTuning {
    fn default() -> Self {
        Self {
            warmup_bars: 60,
            window_1h: 500,
            window_4h: 360,
            window_1d: 365,
        }
    }
}

/// Engine configuration.
///
/// Defaults reproduce the tuned production constants exactly; every knob can
/// be overridden programmatically or through `OMEN_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum candles a timeframe needs before it is analyzed.
    pub min_candles: usize,
    /// Quantile of 24h volumes above which a symbol counts as high-volume.
    pub high_volume_quantile: f64,
    pub indicators: IndicatorParams,
    pub weights: ScoringWeights,
    pub thresholds: SignalThresholds,
    pub backtest: BacktestTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_candles: 30,
            high_volume_quantile: 0.75,
            indicators: IndicatorParams::default(),
            weights: ScoringWeights::default(),
            thresholds: SignalThresholds::default(),
            backtest: BacktestTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            min_candles: env::var("OMEN_MIN_CANDLES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_candles),
            high_volume_quantile: env::var("OMEN_HIGH_VOLUME_QUANTILE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.high_volume_quantile),
            indicators: defaults.indicators,
            weights: ScoringWeights {
                trend: env::var("OMEN_WEIGHT_TREND")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.trend),
                momentum: env::var("OMEN_WEIGHT_MOMENTUM")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.momentum),
                volume: env::var("OMEN_WEIGHT_VOLUME")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.volume),
                orderbook: env::var("OMEN_WEIGHT_ORDERBOOK")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.orderbook),
                volatility: env::var("OMEN_WEIGHT_VOLATILITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.volatility),
            },
            thresholds: SignalThresholds {
                buy: env::var("OMEN_THRESHOLD_BUY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.thresholds.buy),
                conditional: env::var("OMEN_THRESHOLD_CONDITIONAL")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.thresholds.conditional),
            },
            backtest: BacktestTuning {
                warmup_bars: env::var("OMEN_WARMUP_BARS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.backtest.warmup_bars),
                window_1h: defaults.backtest.window_1h,
                window_4h: defaults.backtest.window_4h,
                window_1d: defaults.backtest.window_1d,
            },
        }
    }
}
