//! Market data feed module
//!
//! Candle and 24h ticker retrieval from the exchange REST API

mod binance;
mod limiter;
mod types;

pub use binance::{BinanceClient, BINANCE_API_URL};
pub use limiter::RateLimiter;
pub use types::{Candle, CandleSeries, FeedError, Interval, TickerSnapshot};

use async_trait::async_trait;

/// Trait for candle data sources
///
/// An `Err` always means the fetch failed; an empty `Ok` is a valid answer.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch up to `limit` most recent candles for a symbol
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, FeedError>;

    /// Fetch 24h ticker snapshots for every listed symbol
    async fn get_ticker_universe(&self) -> Result<Vec<TickerSnapshot>, FeedError>;
}
