//! Single-timeframe analyzer.
//!
//! Runs the full indicator table over one candle series and condenses it into
//! a [`TimeframeSnapshot`] holding the latest reading of every indicator plus
//! the signed trend-strength heuristic.

use std::collections::BTreeMap;

use crate::analysis::indicators::{
    adx, atr, bollinger, ema, macd, mfi, obv, rsi, sma, stochastic, vwap, williams_r,
};
use crate::config::EngineConfig;
use crate::types::{
    BollingerReading, Candle, MacdReading, StochasticReading, TimeframeOutcome, TimeframeSnapshot,
};

fn last(series: &[f64]) -> Option<f64> {
    series.last().copied()
}

/// Three signed unit-clamped components averaged together: distance of price
/// from EMA50, slope of EMA21, and ADX distance from the 20 pivot. Each
/// component contributes 0 when its inputs are unavailable or zero.
fn trend_strength(
    price: f64,
    ema50: Option<f64>,
    ema21: Option<f64>,
    ema21_slope: f64,
    adx: Option<f64>,
) -> f64 {
    let mut total = 0.0;

    if let Some(e50) = ema50 {
        if price != 0.0 && e50 != 0.0 {
            let distance = (price - e50) / e50;
            total += (price - e50).signum() * distance.abs().min(1.0);
        }
    }

    if ema21_slope != 0.0 {
        let denom = match ema21 {
            Some(e) if e != 0.0 => e,
            _ => 1.0,
        };
        total += ema21_slope.signum() * (ema21_slope / denom).abs().min(1.0);
    }

    if let Some(a) = adx {
        if a != 0.0 {
            total += (a - 20.0).signum() * ((a - 20.0).abs() / 50.0).min(1.0);
        }
    }

    (total / 3.0).clamp(-1.0, 1.0)
}

/// Analyze one candle series. Series shorter than `config.min_candles` yield
/// the insufficient-data marker; individual indicators that still lack input
/// at that length simply come back `None` inside the snapshot.
pub fn analyze_timeframe(candles: &[Candle], config: &EngineConfig) -> TimeframeOutcome {
    if candles.len() < config.min_candles {
        return TimeframeOutcome::InsufficientData;
    }

    let params = &config.indicators;
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let price = closes[closes.len() - 1];

    let mut ema_map = BTreeMap::new();
    let mut ema21_series: Option<Vec<f64>> = None;
    for &period in &params.ema_periods {
        let series = ema(&closes, period as usize);
        ema_map.insert(period, series.as_deref().and_then(last));
        if period == 21 {
            ema21_series = series;
        }
    }

    let mut sma_map = BTreeMap::new();
    for &period in &params.sma_periods {
        sma_map.insert(period, sma(&closes, period as usize).as_deref().and_then(last));
    }

    let mut rsi_map = BTreeMap::new();
    for &period in &params.rsi_periods {
        rsi_map.insert(period, rsi(&closes, period as usize).as_deref().and_then(last));
    }

    let macd_reading = macd(&closes, params.macd.fast, params.macd.slow, params.macd.signal)
        .and_then(|series| {
            let i = series.macd.len().checked_sub(1)?;
            Some(MacdReading {
                macd: series.macd[i],
                signal: series.signal[i],
                hist: series.histogram[i],
            })
        });

    let stochastic_reading = stochastic(
        candles,
        params.stochastic.k_period,
        params.stochastic.d_period,
        params.stochastic.smooth_k,
    )
    .and_then(|series| {
        Some(StochasticReading {
            k: last(&series.k)?,
            d: last(&series.d)?,
        })
    });

    let bb_reading = bollinger(&closes, params.bollinger.period, params.bollinger.std_devs)
        .and_then(|series| series.last().copied())
        .map(|point| BollingerReading {
            mid: point.mid,
            upper: point.upper,
            lower: point.lower,
        });

    let atr_value = atr(candles, params.atr_period).as_deref().and_then(last);
    let adx_value = adx(candles, params.adx_period).and_then(|series| last(&series.adx));

    let ema21_slope = ema21_series
        .as_ref()
        .map(|s| {
            if s.len() >= 2 {
                s[s.len() - 1] - s[s.len() - 2]
            } else {
                0.0
            }
        })
        .unwrap_or(0.0);

    let strength = trend_strength(
        price,
        ema_map.get(&50).copied().flatten(),
        ema_map.get(&21).copied().flatten(),
        ema21_slope,
        adx_value,
    );

    TimeframeOutcome::Ready(TimeframeSnapshot {
        price,
        ema: ema_map,
        sma: sma_map,
        rsi: rsi_map,
        macd: macd_reading,
        stochastic: stochastic_reading,
        willr: williams_r(candles, params.willr_period).as_deref().and_then(last),
        bb: bb_reading,
        atr: atr_value,
        obv: obv(candles).as_deref().and_then(last),
        mfi: mfi(candles, params.mfi_period).as_deref().and_then(last),
        vwap: vwap(candles),
        adx: adx_value,
        trend_strength: strength,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(len: usize) -> Vec<Candle> {
        (0..len)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle {
                    open_time: i as i64 * 3_600_000,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                    quote_volume: 0.0,
                    num_trades: 10,
                    taker_buy_volume: 0.0,
                    taker_buy_quote_volume: 0.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_short_series_marks_insufficient() {
        let config = EngineConfig::default();
        let candles = uptrend(29);
        assert_eq!(analyze_timeframe(&candles, &config), TimeframeOutcome::InsufficientData);
    }

    #[test]
    fn test_snapshot_has_configured_periods() {
        let config = EngineConfig::default();
        let candles = uptrend(250);
        let outcome = analyze_timeframe(&candles, &config);
        let snapshot = outcome.ready().unwrap();

        assert_eq!(snapshot.price, 349.0);
        assert!(snapshot.ema_value(9).is_some());
        assert!(snapshot.ema_value(21).is_some());
        assert!(snapshot.ema_value(50).is_some());
        assert!(snapshot.sma_value(50).is_some());
        assert!(snapshot.sma_value(200).is_some());
        assert!(snapshot.rsi_value(14).is_some());
        assert!(snapshot.rsi_value(7).is_some());
        assert!(snapshot.rsi_value(21).is_some());
        assert!(snapshot.macd.is_some());
        assert!(snapshot.stochastic.is_some());
        assert!(snapshot.willr.is_some());
        assert!(snapshot.bb.is_some());
        assert!(snapshot.atr.is_some());
        assert!(snapshot.obv.is_some());
        assert!(snapshot.mfi.is_some());
        assert!(snapshot.vwap.is_some());
        assert!(snapshot.adx.is_some());
    }

    #[test]
    fn test_indicators_missing_at_minimum_length_stay_none() {
        let config = EngineConfig::default();
        // 30 candles clears the analyzer gate but not SMA(200).
        let candles = uptrend(30);
        let outcome = analyze_timeframe(&candles, &config);
        let snapshot = outcome.ready().unwrap();
        assert!(snapshot.sma_value(200).is_none());
        assert!(snapshot.adx.is_none());
        assert!(snapshot.rsi_value(14).is_some());
    }

    #[test]
    fn test_uptrend_has_positive_strength() {
        let config = EngineConfig::default();
        let candles = uptrend(250);
        let snapshot = analyze_timeframe(&candles, &config).ready().unwrap().clone();
        assert!(snapshot.trend_strength > 0.0);
        assert!(snapshot.trend_strength <= 1.0);
    }

    #[test]
    fn test_downtrend_has_negative_strength() {
        let config = EngineConfig::default();
        let candles: Vec<Candle> = (0..250)
            .map(|i| {
                let close = 500.0 - i as f64;
                Candle {
                    open_time: i as i64 * 3_600_000,
                    open: close + 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                    quote_volume: 0.0,
                    num_trades: 10,
                    taker_buy_volume: 0.0,
                    taker_buy_quote_volume: 0.0,
                }
            })
            .collect();
        let snapshot = analyze_timeframe(&candles, &config).ready().unwrap().clone();
        assert!(snapshot.trend_strength < 0.0);
        assert!(snapshot.trend_strength >= -1.0);
    }

    #[test]
    fn test_trend_strength_components() {
        // Only the ADX component fires: price sits on the EMA and the slope
        // is flat. ADX 45 gives (45 - 20) / 50 = 0.5, divided by 3.
        let strength = trend_strength(100.0, Some(100.0), Some(100.0), 0.0, Some(45.0));
        assert!((strength - 0.5 / 3.0).abs() < 1e-12);

        // All components absent.
        assert_eq!(trend_strength(100.0, None, None, 0.0, None), 0.0);

        // Strong everything clamps at 1.
        let strength = trend_strength(300.0, Some(100.0), Some(100.0), 150.0, Some(90.0));
        assert!(strength <= 1.0);
        assert!(strength > 0.9);
    }
}
