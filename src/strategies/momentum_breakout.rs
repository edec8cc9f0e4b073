//! Momentum-breakout strategy.
//!
//! Chases strength instead of weakness: a firm ADX, positive MACD momentum on
//! both intraday timeframes, price pressing the recent high on expanding
//! volume and a rising OBV. Entries trigger on the break of that high.

use crate::analysis::indicators::obv;
use crate::strategies::{
    detect_levels, detect_patterns, format_price, insufficient_output, risk_reward,
    targets_from_ratios, trend_analysis, Strategy, StrategyContext,
};
use crate::types::{
    AdvancedAnalysis, Candle, EntryKind, EntryPoint, Reason, RecommendationSummary, StopLoss,
    TradeRecommendation,
};

/// Tunables of the momentum-breakout strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumBreakoutParams {
    /// ADX at or above which the trend counts as established.
    pub min_adx: f64,
    /// Bars scanned for the breakout reference high and baseline volume.
    pub breakout_lookback: usize,
    /// Fraction of the reference high that counts as "pressing" it.
    pub near_high_fraction: f64,
    /// Last-bar volume must exceed this multiple of the baseline mean.
    pub volume_expansion: f64,
    /// Bars back the OBV comparison reaches.
    pub obv_lookback: usize,
    /// Score multiplier when the daily trend points the other way.
    pub weak_trend_damp: f64,
    pub stop_atr_multiple: f64,
    pub fallback_stop_fraction: f64,
    pub target_ratios: Vec<f64>,
}

impl Default for MomentumBreakoutParams {
    fn default() -> Self {
        Self {
            min_adx: 25.0,
            breakout_lookback: 20,
            near_high_fraction: 0.98,
            volume_expansion: 1.5,
            obv_lookback: 5,
            weak_trend_damp: 0.6,
            stop_atr_multiple: 2.0,
            fallback_stop_fraction: 0.03,
            target_ratios: vec![2.0, 3.0, 5.0],
        }
    }
}

pub struct MomentumBreakoutStrategy {
    params: MomentumBreakoutParams,
}

impl MomentumBreakoutStrategy {
    pub fn new() -> Self {
        Self { params: MomentumBreakoutParams::default() }
    }

    pub fn with_params(params: MomentumBreakoutParams) -> Self {
        Self { params }
    }

    /// Highest high over the lookback window ending just before the last bar.
    fn reference_high(&self, candles: &[Candle]) -> Option<f64> {
        if candles.len() < 2 {
            return None;
        }
        let window_end = candles.len() - 1;
        let window_start = window_end.saturating_sub(self.params.breakout_lookback);
        Some(
            candles[window_start..window_end]
                .iter()
                .fold(f64::MIN, |acc, c| acc.max(c.high)),
        )
    }

    fn volume_expanding(&self, candles: &[Candle]) -> bool {
        if candles.len() < 2 {
            return false;
        }
        let window_end = candles.len() - 1;
        let window_start = window_end.saturating_sub(self.params.breakout_lookback);
        let prior = &candles[window_start..window_end];
        let mean = prior.iter().map(|c| c.volume).sum::<f64>() / prior.len() as f64;
        mean > 0.0 && candles[window_end].volume > self.params.volume_expansion * mean
    }

    fn obv_rising(&self, candles: &[Candle]) -> bool {
        obv(candles)
            .map(|series| {
                series.len() > self.params.obv_lookback
                    && series[series.len() - 1]
                        > series[series.len() - 1 - self.params.obv_lookback]
            })
            .unwrap_or(false)
    }
}

impl Default for MomentumBreakoutStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MomentumBreakoutStrategy {
    fn id(&self) -> &'static str {
        "momentum_breakout"
    }

    fn name(&self) -> &'static str {
        "Momentum Breakout"
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> AdvancedAnalysis {
        if !ctx.has_any_timeframe() {
            return insufficient_output(&ctx.bundle.symbol);
        }

        let p = &self.params;
        let price = ctx.price();
        let trend = trend_analysis(ctx);
        let candles = ctx.pattern_candles();
        let patterns = detect_patterns(candles);
        let sr = detect_levels(ctx.level_candles(), price);

        let adx = ctx
            .four_hour()
            .and_then(|s| s.adx)
            .or_else(|| ctx.one_hour().and_then(|s| s.adx));
        let reference_high = self.reference_high(candles);

        let mut score: f64 = 0.0;
        let mut reasons = Vec::new();

        if let Some(a) = adx {
            if a >= p.min_adx {
                score += 0.25;
                reasons.push(Reason::new("adx_strong").with("adx", format!("{:.1}", a)));
            }
        }
        if ctx
            .one_hour()
            .and_then(|s| s.macd_hist())
            .map(|h| h > 0.0)
            .unwrap_or(false)
        {
            score += 0.15;
            reasons.push(Reason::new("macd_1h_positive"));
        }
        if ctx
            .four_hour()
            .and_then(|s| s.macd_hist())
            .map(|h| h > 0.0)
            .unwrap_or(false)
        {
            score += 0.15;
            reasons.push(Reason::new("macd_4h_positive"));
        }
        if let Some(high) = reference_high {
            if price >= p.near_high_fraction * high {
                score += 0.2;
                reasons.push(Reason::new("near_recent_high").with("high", format_price(high)));
            }
            if price > high {
                score += 0.1;
                reasons.push(Reason::new("breakout").with("high", format_price(high)));
            }
        }
        if self.obv_rising(candles) {
            score += 0.1;
            reasons.push(Reason::new("obv_rising"));
        }
        if self.volume_expanding(candles) {
            score += 0.15;
            reasons.push(Reason::new("volume_expansion"));
        }

        let daily_strength = ctx.daily().map(|s| s.trend_strength).unwrap_or(0.0);
        if daily_strength <= 0.0 && ctx.daily().is_some() {
            score *= p.weak_trend_damp;
            reasons.push(
                Reason::new("counter_trend_damp")
                    .with("trendStrength", format!("{:.2}", daily_strength)),
            );
        }

        if reasons.is_empty() {
            reasons.push(Reason::new("no_momentum_setup"));
        }

        let confidence = score.clamp(0.0, 1.0);
        let recommendation = TradeRecommendation::from_score(confidence);

        let stop_loss = if price > 0.0 {
            let distance = ctx
                .atr()
                .map(|a| a * p.stop_atr_multiple)
                .unwrap_or(price * p.fallback_stop_fraction);
            Some(StopLoss { price: price - distance, distance })
        } else {
            None
        };
        let profit_targets = stop_loss
            .map(|s| targets_from_ratios(price, s.distance, &p.target_ratios))
            .unwrap_or_default();
        let rr = risk_reward(&profit_targets);

        let mut entry_points = Vec::new();
        if price > 0.0 {
            match reference_high {
                Some(high) if price > high => {
                    entry_points.push(EntryPoint {
                        kind: EntryKind::Market,
                        price,
                        confidence,
                        reason: Reason::new("breakout_entry").with("high", format_price(high)),
                        level: "recent_high".to_string(),
                        required_confirmation: !recommendation.is_actionable(),
                    });
                }
                Some(high) => {
                    entry_points.push(EntryPoint {
                        kind: EntryKind::Limit,
                        price: high,
                        confidence: confidence * 0.8,
                        reason: Reason::new("await_breakout").with("high", format_price(high)),
                        level: "recent_high".to_string(),
                        required_confirmation: true,
                    });
                }
                None => {
                    entry_points.push(EntryPoint {
                        kind: EntryKind::Market,
                        price,
                        confidence,
                        reason: Reason::new("momentum_entry"),
                        level: "market".to_string(),
                        required_confirmation: !recommendation.is_actionable(),
                    });
                }
            }
        }

        let mut lines = vec![
            format!(
                "{}: {} (confidence {:.0}%)",
                ctx.bundle.symbol,
                recommendation.label(),
                confidence * 100.0
            ),
            format!(
                "ADX {}, breakout level {}",
                adx.map(|a| format!("{:.1}", a)).unwrap_or_else(|| "n/a".to_string()),
                reference_high.map(format_price).unwrap_or_else(|| "n/a".to_string())
            ),
        ];
        if let Some(stop) = stop_loss {
            lines.push(format!("Stop {} ({} wide)", format_price(stop.price), format_price(stop.distance)));
        }

        AdvancedAnalysis {
            recommendation: RecommendationSummary {
                recommendation,
                confidence_score: confidence,
                detailed_reasons: reasons,
            },
            trend_analysis: trend,
            stop_loss,
            profit_targets,
            risk_reward: rr,
            entry_points,
            candle_patterns: patterns,
            support_resistance: Some(sr),
            detailed_report: lines.join("\n"),
        }
    }
}
