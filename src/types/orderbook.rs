//! Order book snapshot types consumed by the signal composer.

use serde::{Deserialize, Serialize};

/// A single price level in an order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLevel {
    /// Price at this level
    pub price: f64,
    /// Total quantity available at this price
    pub quantity: f64,
}

/// Order book snapshot supplied alongside the candle bundle.
///
/// `bids` are ordered best-first (descending price), `asks` best-first
/// (ascending price). Either side may be empty; scoring code treats an
/// empty side the same as a missing book.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookSnapshot {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBookSnapshot {
    /// Best (highest) bid price.
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    /// Best (lowest) ask price.
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }

    /// Midpoint between best bid and best ask.
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Bid/ask spread as a fraction of the mid price.
    pub fn spread_fraction(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        let mid = (bid + ask) / 2.0;
        let denom = if mid == 0.0 { 1.0 } else { mid };
        Some((ask - bid) / denom)
    }

    /// Cumulative bid and ask quantity within `fraction` of the mid price.
    pub fn depth_within(&self, fraction: f64) -> Option<(f64, f64)> {
        let mid = self.mid_price()?;
        let denom = if mid == 0.0 { 1.0 } else { mid };
        let near = |levels: &[BookLevel]| {
            levels
                .iter()
                .filter(|l| ((l.price - mid) / denom).abs() <= fraction)
                .map(|l| l.quantity)
                .sum::<f64>()
        };
        Some((near(&self.bids), near(&self.asks)))
    }
}
