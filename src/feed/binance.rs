//! Binance spot REST candle source

use super::{CandleSeries, CandleSource, FeedError, Interval, RateLimiter, TickerSnapshot};
use crate::config::FeedConfig;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::Candle;

/// Binance REST base URL
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Binance caps a single klines request at 1000 candles
const MAX_KLINE_LIMIT: usize = 1000;

/// 24hr ticker entry; prices and volumes arrive as strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker {
    symbol: String,
    price_change_percent: String,
    last_price: String,
    quote_volume: String,
}

/// Candle source backed by the Binance spot REST API
pub struct BinanceClient {
    base_url: String,
    client: Client,
    limiter: Arc<RateLimiter>,
}

impl BinanceClient {
    /// Create a client from feed configuration
    pub fn new(config: &FeedConfig, limiter: Arc<RateLimiter>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FeedError::Transient(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            limiter,
        })
    }

    /// GET a path and return the body, mapping transport failures
    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, FeedError> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::trace!(url = %url, "Binance request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Transient(format!(
                "Binance API error: {} - {}",
                status, body
            )));
        }

        response
            .text()
            .await
            .map_err(|e| FeedError::Transient(e.to_string()))
    }

    /// Parse a klines payload into candles
    fn parse_klines(body: &str) -> Result<Vec<Candle>, FeedError> {
        let rows: Vec<Vec<serde_json::Value>> =
            serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

        rows.iter()
            .enumerate()
            .map(|(i, row)| Self::parse_kline_row(row).ok_or_else(|| {
                FeedError::Malformed(format!("unparseable kline row {}", i))
            }))
            .collect()
    }

    fn parse_kline_row(row: &[serde_json::Value]) -> Option<Candle> {
        if row.len() < 6 {
            return None;
        }

        let field = |idx: usize| -> Option<f64> {
            match &row[idx] {
                serde_json::Value::String(s) => s.parse().ok(),
                serde_json::Value::Number(n) => n.as_f64(),
                _ => None,
            }
        };

        let open_time = row[0].as_i64()?;
        Some(Candle {
            timestamp: Utc.timestamp_millis_opt(open_time).single()?,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
            volume: field(5)?,
        })
    }

    /// Parse a 24hr ticker payload
    fn parse_tickers(body: &str) -> Result<Vec<TickerSnapshot>, FeedError> {
        let tickers: Vec<BinanceTicker> =
            serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

        tickers
            .into_iter()
            .map(|t| {
                let decimal = |s: &str| {
                    Decimal::from_str(s).map_err(|e| {
                        FeedError::Malformed(format!("{}: bad decimal {:?}: {}", t.symbol, s, e))
                    })
                };
                Ok(TickerSnapshot {
                    last_price: decimal(&t.last_price)?,
                    quote_volume_24h: decimal(&t.quote_volume)?,
                    price_change_pct_24h: decimal(&t.price_change_percent)?,
                    symbol: t.symbol,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, FeedError> {
        let limit = limit.clamp(1, MAX_KLINE_LIMIT);
        let body = self
            .get_text(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_uppercase()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = Self::parse_klines(&body)?;
        tracing::debug!(
            symbol,
            interval = %interval,
            count = candles.len(),
            "Fetched candles"
        );
        CandleSeries::new(candles)
    }

    async fn get_ticker_universe(&self) -> Result<Vec<TickerSnapshot>, FeedError> {
        let body = self.get_text("/api/v3/ticker/24hr", &[]).await?;
        let tickers = Self::parse_tickers(&body)?;
        tracing::debug!(count = tickers.len(), "Fetched 24h tickers");
        Ok(tickers)
    }
}
