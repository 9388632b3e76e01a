//! Integration tests for feed types and request pacing

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use market_radar::config::FeedConfig;
use market_radar::feed::{BinanceClient, Candle, CandleSeries, CandleSource, FeedError, Interval, RateLimiter};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn candle(minutes: i64, close: f64) -> Candle {
    Candle {
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + ChronoDuration::minutes(minutes),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10.0,
    }
}

#[test]
fn test_out_of_order_series_is_malformed() {
    let result = CandleSeries::new(vec![candle(10, 1.0), candle(5, 1.0)]);
    assert!(matches!(result, Err(FeedError::Malformed(_))));
}

#[test]
fn test_empty_series_is_valid() {
    let series = tokio_test::assert_ok!(CandleSeries::new(Vec::new()));
    assert!(series.is_empty());
    assert!(series.last().is_none());
}

#[tokio::test]
async fn test_shared_limiter_paces_concurrent_tasks() {
    let limiter = Arc::new(RateLimiter::new(100));
    let start = Instant::now();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.acquire().await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    // 20 slots 10ms apart, the first immediate
    assert!(start.elapsed() >= Duration::from_millis(185));
}

#[tokio::test]
async fn test_unreachable_exchange_is_transient() {
    let config = FeedConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 1,
        ..FeedConfig::default()
    };
    let client = BinanceClient::new(&config, Arc::new(RateLimiter::unlimited())).unwrap();
    let source: Arc<dyn CandleSource> = Arc::new(client);

    let err = source.get_candles("BTCUSDT", Interval::H1, 200).await.unwrap_err();
    assert!(err.is_transient());

    let err = source.get_ticker_universe().await.unwrap_err();
    assert!(err.is_transient());
}
