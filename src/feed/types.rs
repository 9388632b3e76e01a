//! Market data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Candle feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or API failure; retried at the next opportunity
    #[error("Transient fetch error: {0}")]
    Transient(String),
    /// Upstream returned data that failed shape or value validation
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FeedError {
    /// Whether this failure came from the transport rather than the payload
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Transient(_))
    }
}

/// Candle interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 5 minutes
    #[serde(rename = "5m")]
    M5,
    /// 15 minutes
    #[serde(rename = "15m")]
    M15,
    /// 1 hour
    #[serde(rename = "1h")]
    H1,
    /// 4 hours
    #[serde(rename = "4h")]
    H4,
}

impl Interval {
    /// Exchange interval code
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single OHLCV candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Base asset volume
    pub volume: f64,
}

impl Candle {
    fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Absolute candle body
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High-low range
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Time-ordered, validated candle series
///
/// Timestamps are strictly increasing and every field is a non-negative
/// finite number. The series is never mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Validate and wrap a candle vector
    pub fn new(candles: Vec<Candle>) -> Result<Self, FeedError> {
        if let Some(bad) = candles.iter().position(|c| !c.is_well_formed()) {
            return Err(FeedError::Malformed(format!(
                "candle {} has a negative or non-finite field",
                bad
            )));
        }
        if let Some(pair) = candles
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(FeedError::Malformed(format!(
                "timestamps not strictly increasing at index {}",
                pair + 1
            )));
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

/// 24h ticker snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Last traded price
    pub last_price: Decimal,
    /// 24h volume in quote currency
    pub quote_volume_24h: Decimal,
    /// 24h price change in percent
    pub price_change_pct_24h: Decimal,
}
