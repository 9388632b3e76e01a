//! Polling scheduler
//!
//! Drives the scan loop:
//! 1. Fetch the 24h ticker universe and select candidates
//! 2. Fetch each candidate's candles and run every evaluator
//! 3. Pass actionable signals through the cooldown and notify
//! 4. Sleep until the next cycle

use super::types::{CycleOutcome, CycleReport, SchedulerSettings, SchedulerState, SymbolTally};
use crate::alert::{AlertDeduplicator, DedupKey, Notifier};
use crate::feed::{CandleSource, FeedError, Interval};
use crate::levels::detect_levels;
use crate::signal::{evaluate_all, MarketSnapshot, Signal};
use crate::telemetry::{self, AlertOutcome};
use crate::universe;
use chrono::Utc;
use futures_util::{future, stream, StreamExt};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Why one symbol produced no evaluation
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Periodic market scanner
pub struct PollingScheduler<S: CandleSource, N: Notifier> {
    source: Arc<S>,
    notifier: Arc<N>,
    dedup: Arc<AlertDeduplicator>,
    settings: SchedulerSettings,
    state: watch::Sender<SchedulerState>,
}

impl<S: CandleSource, N: Notifier> PollingScheduler<S, N> {
    /// Create a scheduler with a fresh cooldown table
    pub fn new(source: Arc<S>, notifier: Arc<N>, settings: SchedulerSettings) -> Self {
        Self::with_deduplicator(source, notifier, Arc::new(AlertDeduplicator::new()), settings)
    }

    /// Create a scheduler sharing an existing cooldown table
    pub fn with_deduplicator(
        source: Arc<S>,
        notifier: Arc<N>,
        dedup: Arc<AlertDeduplicator>,
        settings: SchedulerSettings,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            source,
            notifier,
            dedup,
            settings,
            state,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Observe state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    fn set_state(&self, state: SchedulerState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Scheduler state");
        }
    }

    /// Run cycles until `shutdown` flips to true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_secs = self.settings.poll_interval.as_secs(),
            concurrency = self.settings.max_concurrent_symbols,
            "Scheduler started"
        );

        while !*shutdown.borrow() {
            let report = self.run_cycle(&shutdown).await;

            let pause = match report.outcome {
                CycleOutcome::Backoff => self.settings.backoff,
                CycleOutcome::Interrupted => break,
                CycleOutcome::Completed => {
                    self.set_state(SchedulerState::Sleeping);
                    self.settings.poll_interval
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.set_state(SchedulerState::Stopped);
        info!("Scheduler stopped");
    }

    /// Run one full cycle
    ///
    /// Never fails: a universe fetch error yields a `Backoff` report and
    /// per-symbol errors are counted in the report.
    pub async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) -> CycleReport {
        let started = Instant::now();

        let pruned = self.dedup.prune(Utc::now(), self.settings.cooldown);
        if pruned > 0 {
            debug!(pruned, "Expired cooldowns removed");
        }

        self.set_state(SchedulerState::FetchingUniverse);
        let tickers = match self.source.get_ticker_universe().await {
            Ok(tickers) => tickers,
            Err(e) => {
                error!(
                    error = %e,
                    backoff_secs = self.settings.backoff.as_secs(),
                    "Universe fetch failed"
                );
                telemetry::record_backoff();
                self.set_state(SchedulerState::Backoff);
                return CycleReport::new(CycleOutcome::Backoff);
            }
        };

        let candidates = universe::select(&tickers, &self.settings.universe);
        telemetry::set_candidates(candidates.len());
        info!(
            tickers = tickers.len(),
            candidates = candidates.len(),
            "Universe selected"
        );

        self.set_state(SchedulerState::Evaluating);
        let tallies: Vec<SymbolTally> = stream::iter(candidates.iter())
            .take_while(|_| future::ready(!*shutdown.borrow()))
            .map(|symbol| self.scan_symbol(symbol))
            .buffer_unordered(self.settings.max_concurrent_symbols.max(1))
            .collect()
            .await;

        let mut report = CycleReport::new(if tallies.len() < candidates.len() {
            CycleOutcome::Interrupted
        } else {
            CycleOutcome::Completed
        });
        report.candidates = candidates.len();
        for tally in &tallies {
            if tally.failed {
                report.symbols_failed += 1;
            } else {
                report.symbols_evaluated += 1;
            }
            report.signals += tally.signals;
            report.alerts_sent += tally.sent;
            report.alerts_suppressed += tally.suppressed;
            report.alerts_failed += tally.notify_failed;
        }

        let elapsed = started.elapsed();
        telemetry::record_cycle(elapsed);
        info!(
            evaluated = report.symbols_evaluated,
            failed = report.symbols_failed,
            signals = report.signals,
            alerts = report.alerts_sent,
            suppressed = report.alerts_suppressed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Cycle complete"
        );

        report
    }

    /// Evaluate one symbol, dispatch its alerts, then pause
    async fn scan_symbol(&self, symbol: &str) -> SymbolTally {
        let mut tally = SymbolTally::default();

        let evaluated = match tokio::time::timeout(
            self.settings.symbol_timeout,
            self.evaluate_symbol(symbol),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ScanError::Timeout(self.settings.symbol_timeout)),
        };

        match evaluated {
            Ok(signals) => {
                telemetry::record_symbol(false);
                tally.signals = signals.len();
                self.dispatch(signals, &mut tally).await;
            }
            Err(e) => {
                warn!(symbol, error = %e, "Symbol skipped");
                telemetry::record_symbol(true);
                tally.failed = true;
            }
        }

        if !self.settings.per_symbol_delay.is_zero() {
            tokio::time::sleep(self.settings.per_symbol_delay).await;
        }

        tally
    }

    /// Fetch all timeframes and run the evaluator suite
    pub async fn evaluate_symbol(&self, symbol: &str) -> Result<Vec<Signal>, ScanError> {
        let limit = self.settings.candle_limit;
        let (h1, h4, m15, m5) = tokio::try_join!(
            self.source.get_candles(symbol, Interval::H1, limit),
            self.source.get_candles(symbol, Interval::H4, limit),
            self.source.get_candles(symbol, Interval::M15, limit),
            self.source.get_candles(symbol, Interval::M5, limit),
        )?;

        let levels = detect_levels(
            &[(Interval::H1, &h1), (Interval::H4, &h4)],
            self.settings.level_window,
            self.settings.level_delta,
        );

        let snapshot = MarketSnapshot {
            symbol,
            h1: &h1,
            h4: &h4,
            m15: &m15,
            m5: &m5,
            levels: &levels,
        };
        let signals = evaluate_all(&snapshot, &self.settings.evaluators);
        for signal in &signals {
            telemetry::record_signal(signal.signal_type());
        }

        debug!(symbol, levels = levels.len(), signals = signals.len(), "Symbol evaluated");
        Ok(signals)
    }

    /// Send actionable signals that clear the cooldown, most confident first
    async fn dispatch(&self, signals: Vec<Signal>, tally: &mut SymbolTally) {
        let mut actionable: Vec<Signal> = signals.into_iter().filter(Signal::is_actionable).collect();
        actionable.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        for signal in actionable {
            let key = DedupKey::for_signal(self.settings.cooldown_scope, &signal);
            if !self
                .dedup
                .should_notify(&key, Utc::now(), self.settings.cooldown)
            {
                debug!(
                    symbol = %signal.symbol,
                    signal_type = %signal.signal_type(),
                    "Alert suppressed by cooldown"
                );
                telemetry::record_alert(AlertOutcome::Suppressed);
                tally.suppressed += 1;
                continue;
            }

            match self
                .notifier
                .notify(&self.settings.destination, &signal.render())
                .await
            {
                Ok(()) => {
                    info!(
                        symbol = %signal.symbol,
                        signal_type = %signal.signal_type(),
                        confidence = signal.confidence,
                        "Alert sent"
                    );
                    telemetry::record_alert(AlertOutcome::Sent);
                    tally.sent += 1;
                }
                Err(e) => {
                    // Cooldown stays consumed
                    warn!(symbol = %signal.symbol, error = %e, "Alert delivery failed");
                    telemetry::record_alert(AlertOutcome::Failed);
                    tally.notify_failed += 1;
                }
            }
        }
    }
}
