//! Shared builders for strategy unit tests.

use std::collections::BTreeMap;

use crate::types::{
    BaseAnalysis, Candle, CompositeSignal, SignalFlags, SignalVerdict, SymbolBundle,
    TimeframeOutcome, TimeframeSet, TimeframeSnapshot,
};

pub(crate) fn snapshot(price: f64) -> TimeframeSnapshot {
    TimeframeSnapshot {
        price,
        ema: BTreeMap::new(),
        sma: BTreeMap::new(),
        rsi: BTreeMap::new(),
        macd: None,
        stochastic: None,
        willr: None,
        bb: None,
        atr: None,
        obv: None,
        mfi: None,
        vwap: None,
        adx: None,
        trend_strength: 0.0,
    }
}

pub(crate) fn neutral_signal() -> CompositeSignal {
    CompositeSignal {
        flags: SignalFlags {
            trend_flag: 0.0,
            momentum_flag: 0.0,
            volume_flag: 0.0,
            orderbook_flag: 0.5,
            volatility_flag: 0.5,
        },
        score: 0.125,
        recommendation: SignalVerdict::Wait,
    }
}

pub(crate) fn signal_with_score(score: f64) -> CompositeSignal {
    CompositeSignal {
        flags: SignalFlags {
            trend_flag: 1.0,
            momentum_flag: 0.9,
            volume_flag: 1.0,
            orderbook_flag: 1.0,
            volatility_flag: 1.0,
        },
        score,
        recommendation: SignalVerdict::Buy,
    }
}

pub(crate) fn base(
    one_hour: Option<TimeframeSnapshot>,
    four_hour: Option<TimeframeSnapshot>,
    daily: Option<TimeframeSnapshot>,
    signal: CompositeSignal,
) -> BaseAnalysis {
    let wrap = |s: Option<TimeframeSnapshot>| match s {
        Some(snapshot) => TimeframeOutcome::Ready(snapshot),
        None => TimeframeOutcome::InsufficientData,
    };
    BaseAnalysis {
        timeframes: TimeframeSet {
            one_hour: wrap(one_hour),
            four_hour: wrap(four_hour),
            daily: wrap(daily),
        },
        signal,
    }
}

pub(crate) fn candle(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        open_time,
        open,
        high,
        low,
        close,
        volume: 1_000.0,
        quote_volume: 0.0,
        num_trades: 10,
        taker_buy_volume: 0.0,
        taker_buy_quote_volume: 0.0,
    }
}

pub(crate) fn uptrend_candles(len: usize, start: f64, step: f64) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let close = start + i as f64 * step;
            candle(i as i64 * 3_600_000, close - step / 2.0, close + 1.0, close - 1.0, close)
        })
        .collect()
}

pub(crate) fn bundle(symbol: &str, price: f64, candles_1h: Vec<Candle>) -> SymbolBundle {
    SymbolBundle {
        symbol: symbol.to_string(),
        current_price: price,
        change_24h: 0.0,
        volume_24h: 1_000_000.0,
        candles_1h,
        candles_4h: Vec::new(),
        candles_1d: Vec::new(),
        order_book: None,
    }
}
