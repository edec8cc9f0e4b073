//! End-to-end tests for the batch analysis pipeline.

use omen::types::{AnalysisRecord, Candle, SignalVerdict, SymbolBundle};
use omen::{AnalysisEngine, CancelToken, EngineError};

fn candle(open_time: i64, close: f64, volume: f64) -> Candle {
    Candle {
        open_time,
        open: close - 0.5,
        high: close + 0.5,
        low: close - 1.0,
        close,
        volume,
        quote_volume: 0.0,
        num_trades: 0,
        taker_buy_volume: 0.0,
        taker_buy_quote_volume: 0.0,
    }
}

/// Rising series with a small repeating wave so oscillators see both sides.
fn series(len: usize, step_ms: i64) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let wave = ((i % 8) as f64) * 0.4;
            candle(
                i as i64 * step_ms,
                100.0 + i as f64 * 0.5 + wave,
                1_000.0 + ((i % 5) as f64) * 50.0,
            )
        })
        .collect()
}

fn bundle(symbol: &str, volume_24h: f64) -> SymbolBundle {
    let candles_1h = series(250, 3_600_000);
    let candles_4h = series(250, 14_400_000);
    let candles_1d = series(250, 86_400_000);
    let current_price = candles_1h.last().map(|c| c.close).unwrap_or(0.0);
    SymbolBundle {
        symbol: symbol.to_string(),
        current_price,
        change_24h: 2.5,
        volume_24h,
        candles_1h,
        candles_4h,
        candles_1d,
        order_book: None,
    }
}

/// Linear close increase at constant volume, the cleanest possible uptrend.
fn linear_series(len: usize, step_ms: i64) -> Vec<Candle> {
    (0..len)
        .map(|i| candle(i as i64 * step_ms, 100.0 + i as f64 * 0.5, 1_000.0))
        .collect()
}

#[test]
fn test_batch_produces_ready_records_for_clean_data() {
    let engine = AnalysisEngine::default();
    let bundles: Vec<SymbolBundle> = ["BTCUSDT", "ETHUSDT", "SOLUSDT"]
        .iter()
        .map(|s| bundle(s, 1_000_000.0))
        .collect();

    let records = engine.run_full_analysis(&bundles, "main_balanced").unwrap();

    assert_eq!(records.len(), 3);
    for record in &records {
        let analysis = record.ready().expect("record should be ready");
        assert!(analysis.analysis.timeframes.one_hour.is_ready());
        assert!(analysis.analysis.timeframes.four_hour.is_ready());
        assert!(analysis.analysis.timeframes.daily.is_ready());

        let signal = &analysis.analysis.signal;
        assert!(signal.score >= 0.0 && signal.score <= 1.0);
        match signal.recommendation {
            SignalVerdict::Buy => assert!(signal.score >= 0.75),
            SignalVerdict::Conditional => assert!(signal.score >= 0.60 && signal.score < 0.75),
            SignalVerdict::Wait => assert!(signal.score < 0.60),
        }

        let summary = &analysis.advanced.recommendation;
        assert!(summary.confidence_score >= 0.0 && summary.confidence_score <= 1.0);
        assert!(!summary.detailed_reasons.is_empty());
        assert!(analysis.advanced.detailed_report.contains(&analysis.symbol));
    }
}

#[test]
fn test_sustained_uptrend_sets_trend_and_momentum_flags() {
    let engine = AnalysisEngine::default();
    let candles_1h = linear_series(250, 3_600_000);
    let current_price = candles_1h.last().map(|c| c.close).unwrap_or(0.0);
    let bundles = [SymbolBundle {
        symbol: "BTCUSDT".to_string(),
        current_price,
        change_24h: 2.5,
        volume_24h: 1_000_000.0,
        candles_1h,
        candles_4h: linear_series(250, 14_400_000),
        candles_1d: linear_series(250, 86_400_000),
        order_book: None,
    }];

    let records = engine.run_full_analysis(&bundles, "main_balanced").unwrap();
    let analysis = records[0].ready().expect("record should be ready");

    // Price sits above the 50-bar EMA on both slow timeframes and the MACD
    // histogram is positive while the ramp is still pulling the fast EMA up.
    let flags = &analysis.analysis.signal.flags;
    assert_eq!(flags.trend_flag, 1.0);
    assert!(flags.momentum_flag >= 0.4);
}

#[test]
fn test_snapshot_exposes_indicator_values() {
    let engine = AnalysisEngine::default();
    let records = engine
        .run_full_analysis(&[bundle("BTCUSDT", 1_000.0)], "main_balanced")
        .unwrap();

    let analysis = records[0].ready().expect("ready record");
    let daily = analysis.analysis.timeframes.daily.ready().expect("daily snapshot");

    assert!(daily.price > 0.0);
    assert!(daily.ema_value(21).is_some());
    assert!(daily.sma_value(50).is_some());
    let rsi = daily.rsi_value(14).expect("rsi value");
    assert!((0.0..=100.0).contains(&rsi));
    assert!(daily.macd.is_some());
    assert!(daily.stochastic.is_some());
    assert!(daily.bb.is_some());
    assert!(daily.atr.map(|a| a > 0.0).unwrap_or(false));
    assert!(daily.obv.is_some());
    assert!(daily.mfi.is_some());
    assert!(daily.vwap.is_some());
    assert!(daily.adx.is_some());
    assert!((-1.0..=1.0).contains(&daily.trend_strength));
}

#[test]
fn test_outputs_are_deterministic() {
    let engine = AnalysisEngine::default();
    let bundles = vec![bundle("BTCUSDT", 500.0), bundle("ETHUSDT", 900.0)];

    let first = engine.run_full_analysis(&bundles, "momentum_breakout").unwrap();
    let second = engine.run_full_analysis(&bundles, "momentum_breakout").unwrap();

    let a = serde_json::to_string(&first).expect("serialize first run");
    let b = serde_json::to_string(&second).expect("serialize second run");
    assert_eq!(a, b);
}

/// Opt-in log output for debugging failures, driven by RUST_LOG.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn test_failed_symbol_is_isolated_and_reported() {
    init_tracing();
    let engine = AnalysisEngine::default();
    let mut bad = bundle("ETHUSDT", 500.0);
    bad.candles_4h[10].open_time = bad.candles_4h[9].open_time;

    let records = engine
        .run_full_analysis(&[bundle("BTCUSDT", 500.0), bad], "main_balanced")
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[0].is_ready());
    assert!(!records[1].is_ready());
    assert_eq!(records[1].symbol(), "ETHUSDT");
    let message = records[1].error().expect("failure message");
    assert!(message.contains("4h"));
    assert!(message.contains("ordered"));
}

#[test]
fn test_batch_with_no_usable_symbol_is_an_error() {
    let engine = AnalysisEngine::default();
    let mut bad = bundle("BTCUSDT", 500.0);
    bad.current_price = f64::NAN;

    let err = engine.run_full_analysis(&[bad], "main_balanced").unwrap_err();
    assert!(matches!(err, EngineError::NoUsableData { attempted: 1 }));
}

#[test]
fn test_high_volume_is_batch_relative() {
    let engine = AnalysisEngine::default();
    let bundles: Vec<SymbolBundle> =
        [("A", 100.0), ("B", 200.0), ("C", 300.0), ("D", 400.0), ("E", 1_000.0)]
            .iter()
            .map(|(s, v)| bundle(s, *v))
            .collect();

    let records = engine.run_full_analysis(&bundles, "main_balanced").unwrap();

    let flagged: Vec<&str> = records
        .iter()
        .filter_map(AnalysisRecord::ready)
        .filter(|a| a.is_high_volume)
        .map(|a| a.symbol.as_str())
        .collect();
    assert_eq!(flagged, vec!["E"]);
}

#[test]
fn test_unknown_strategy_id_uses_fallback() {
    let engine = AnalysisEngine::default();
    let records = engine
        .run_full_analysis(&[bundle("BTCUSDT", 500.0)], "not_a_strategy")
        .unwrap();
    assert!(records[0].is_ready());
}

#[test]
fn test_cancellation_between_symbols() {
    let engine = AnalysisEngine::default();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = engine
        .run_full_analysis_cancellable(&[bundle("BTCUSDT", 500.0)], "main_balanced", &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_serialized_record_uses_wire_names() {
    let engine = AnalysisEngine::default();
    let records = engine
        .run_full_analysis(&[bundle("BTCUSDT", 500.0)], "main_balanced")
        .unwrap();

    let json = serde_json::to_value(&records[0]).expect("serialize record");
    assert!(json.get("currentPrice").is_some());
    assert!(json.get("isHighVolume").is_some());
    assert_eq!(
        json.pointer("/analysis/timeframes/1h/status").and_then(|v| v.as_str()),
        Some("ready")
    );
    assert!(json.pointer("/analysis/signal/flags/trendFlag").is_some());
    assert!(json.pointer("/advanced/recommendation/confidenceScore").is_some());
}
