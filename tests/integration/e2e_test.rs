//! End-to-end scan cycle tests against a mocked exchange

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use market_radar::alert::{AlertDeduplicator, CooldownScope, Notifier, NotifyError};
use market_radar::config::Config;
use market_radar::feed::{Candle, CandleSeries, CandleSource, FeedError, Interval, TickerSnapshot};
use market_radar::scanner::{CycleOutcome, PollingScheduler, SchedulerSettings, SchedulerState};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// 60 hourly candles on a 20-period sine around 100; optionally ending in
/// a close through the 105 resistance
fn wave(breakout: bool) -> CandleSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut closes: Vec<f64> = (0..60)
        .map(|i| 100.0 + 5.0 * (2.0 * std::f64::consts::PI * i as f64 / 20.0).sin())
        .collect();
    if breakout {
        closes[58] = 104.0;
        closes[59] = 107.0;
    }

    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: start + ChronoDuration::hours(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
        })
        .collect();
    CandleSeries::new(candles).unwrap()
}

struct MockExchange {
    universe_up: bool,
}

#[async_trait]
impl CandleSource for MockExchange {
    async fn get_candles(
        &self,
        symbol: &str,
        _interval: Interval,
        _limit: usize,
    ) -> Result<CandleSeries, FeedError> {
        match symbol {
            "BTCUSDT" => Ok(wave(true)),
            "ETHUSDT" => Ok(wave(false)),
            _ => Err(FeedError::Malformed("unknown symbol".to_string())),
        }
    }

    async fn get_ticker_universe(&self) -> Result<Vec<TickerSnapshot>, FeedError> {
        if !self.universe_up {
            return Err(FeedError::Transient("connection refused".to_string()));
        }
        let ticker = |symbol: &str, change| TickerSnapshot {
            symbol: symbol.to_string(),
            last_price: dec!(100),
            quote_volume_24h: dec!(250000000),
            price_change_pct_24h: change,
        };
        Ok(vec![
            ticker("BTCUSDT", dec!(6.5)),
            ticker("ETHUSDT", dec!(-2.1)),
            ticker("XRPUSDT", dec!(1.0)),
            ticker("USDCUSDT", dec!(0.0)),
        ])
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), message.to_string()));
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _destination: &str, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected(reqwest::StatusCode::BAD_GATEWAY))
    }
}

fn settings() -> SchedulerSettings {
    let mut config = Config::default();
    config.notifier.destination = Some("desk".to_string());
    SchedulerSettings {
        per_symbol_delay: Duration::ZERO,
        ..SchedulerSettings::from_config(&config)
    }
}

#[tokio::test]
async fn test_breakout_alerts_once_then_cools_down() {
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = PollingScheduler::new(
        Arc::new(MockExchange { universe_up: true }),
        Arc::clone(&notifier),
        settings(),
    );
    let (_tx, rx) = watch::channel(false);

    let first = scheduler.run_cycle(&rx).await;
    assert_eq!(first.outcome, CycleOutcome::Completed);
    assert_eq!(first.candidates, 3);
    assert_eq!(first.symbols_evaluated, 2);
    assert_eq!(first.symbols_failed, 1);
    assert_eq!(first.alerts_sent, 1);
    assert_eq!(first.alerts_suppressed, 0);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "desk");
    assert!(messages[0].1.starts_with("[BREAKOUT_LONG] BTCUSDT"));
    assert!(messages[0].1.contains("above resistance 10"));

    let second = scheduler.run_cycle(&rx).await;
    assert_eq!(second.alerts_sent, 0);
    assert_eq!(second.alerts_suppressed, 1);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_concurrent_symbols_give_same_report() {
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = PollingScheduler::new(
        Arc::new(MockExchange { universe_up: true }),
        Arc::clone(&notifier),
        SchedulerSettings {
            max_concurrent_symbols: 3,
            ..settings()
        },
    );
    let (_tx, rx) = watch::channel(false);

    let report = scheduler.run_cycle(&rx).await;
    assert_eq!(report.symbols_evaluated, 2);
    assert_eq!(report.symbols_failed, 1);
    assert_eq!(report.alerts_sent, 1);
}

#[tokio::test]
async fn test_failed_delivery_still_consumes_cooldown() {
    let dedup = Arc::new(AlertDeduplicator::new());
    let scheduler = PollingScheduler::with_deduplicator(
        Arc::new(MockExchange { universe_up: true }),
        Arc::new(FailingNotifier),
        Arc::clone(&dedup),
        settings(),
    );
    let (_tx, rx) = watch::channel(false);

    let first = scheduler.run_cycle(&rx).await;
    assert_eq!(first.alerts_failed, 1);
    assert_eq!(first.alerts_sent, 0);
    assert_eq!(dedup.len(), 1);

    let second = scheduler.run_cycle(&rx).await;
    assert_eq!(second.alerts_suppressed, 1);
    assert_eq!(second.alerts_failed, 0);
}

#[tokio::test]
async fn test_expired_cooldown_allows_new_alert() {
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = PollingScheduler::new(
        Arc::new(MockExchange { universe_up: true }),
        Arc::clone(&notifier),
        SchedulerSettings {
            cooldown: ChronoDuration::zero(),
            cooldown_scope: CooldownScope::SymbolAndType,
            ..settings()
        },
    );
    let (_tx, rx) = watch::channel(false);

    scheduler.run_cycle(&rx).await;
    scheduler.run_cycle(&rx).await;
    assert_eq!(notifier.messages().len(), 2);
}

#[tokio::test]
async fn test_failing_universe_reports_backoff() {
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = PollingScheduler::new(
        Arc::new(MockExchange { universe_up: false }),
        Arc::clone(&notifier),
        settings(),
    );
    let (_tx, rx) = watch::channel(false);

    let report = scheduler.run_cycle(&rx).await;
    assert_eq!(report.outcome, CycleOutcome::Backoff);
    assert_eq!(scheduler.state(), SchedulerState::Backoff);
    assert!(notifier.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_sleeps_between_cycles_until_shutdown() {
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = PollingScheduler::new(
        Arc::new(MockExchange { universe_up: true }),
        Arc::clone(&notifier),
        settings(),
    );
    let mut states = scheduler.subscribe_state();
    let (tx, rx) = watch::channel(false);

    let stopper = async {
        // Wait until the first cycle has finished and the loop is sleeping
        states
            .wait_for(|s| *s == SchedulerState::Sleeping)
            .await
            .unwrap();
        tx.send(true).unwrap();
    };
    tokio::join!(scheduler.run(rx), stopper);

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_evaluate_symbol_direct() {
    let scheduler = PollingScheduler::new(
        Arc::new(MockExchange { universe_up: true }),
        Arc::new(RecordingNotifier::default()),
        settings(),
    );

    let signals = tokio_test::assert_ok!(scheduler.evaluate_symbol("BTCUSDT").await);
    assert_eq!(signals.iter().filter(|s| s.is_actionable()).count(), 1);
    tokio_test::assert_err!(scheduler.evaluate_symbol("XRPUSDT").await);
}
