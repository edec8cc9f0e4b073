use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Candle interval granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    FiveMinute,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timeframe {
    /// Get the timeframe from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "5m" => Some(Timeframe::FiveMinute),
            "1h" => Some(Timeframe::OneHour),
            "4h" => Some(Timeframe::FourHour),
            "1d" => Some(Timeframe::OneDay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::FiveMinute => "5m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHour => "4h",
            Timeframe::OneDay => "1d",
        }
    }

    /// Candle duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        match self {
            Timeframe::FiveMinute => 300_000,
            Timeframe::OneHour => 3_600_000,
            Timeframe::FourHour => 14_400_000,
            Timeframe::OneDay => 86_400_000,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fixed-interval OHLCV summary as delivered by the data-fetch collaborator.
///
/// Sequences of candles are always ordered by strictly increasing `open_time`
/// (unix milliseconds) and are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub quote_volume: f64,
    #[serde(default)]
    pub num_trades: u64,
    #[serde(default)]
    pub taker_buy_volume: f64,
    #[serde(default)]
    pub taker_buy_quote_volume: f64,
}

impl Candle {
    /// Typical price (HLC/3), the base quantity for VWAP and money flow.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Open time as a UTC datetime.
    pub fn open_datetime(&self) -> DateTime<Utc> {
        match Utc.timestamp_millis_opt(self.open_time).single() {
            Some(dt) => dt,
            None => DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// True if every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_roundtrip() {
        for tf in [
            Timeframe::FiveMinute,
            Timeframe::OneHour,
            Timeframe::FourHour,
            Timeframe::OneDay,
        ] {
            assert_eq!(Timeframe::from_str(tf.as_str()), Some(tf));
        }
        assert_eq!(Timeframe::from_str("2w"), None);
    }

    #[test]
    fn test_timeframe_durations() {
        assert_eq!(Timeframe::OneHour.duration_ms(), 3_600_000);
        assert_eq!(Timeframe::OneDay.duration_ms(), 24 * Timeframe::OneHour.duration_ms());
    }

    #[test]
    fn test_typical_price() {
        let candle = Candle {
            open_time: 0,
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 100.0,
            quote_volume: 0.0,
            num_trades: 0,
            taker_buy_volume: 0.0,
            taker_buy_quote_volume: 0.0,
        };
        assert!((candle.typical_price() - 32.0 / 3.0).abs() < 1e-12);
        assert!(candle.is_finite());
    }
}
