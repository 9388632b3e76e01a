//! Scheduler state and cycle reporting types

use crate::alert::CooldownScope;
use crate::config::{Config, MAX_PER_SYMBOL_DELAY_SECONDS};
use crate::signal::EvaluatorParams;
use crate::universe::UniverseFilter;
use std::fmt;
use std::time::Duration;

/// Polling scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    FetchingUniverse,
    Evaluating,
    Sleeping,
    /// Waiting out a failed universe fetch
    Backoff,
    /// Shut down; terminal
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::FetchingUniverse => "fetching_universe",
            SchedulerState::Evaluating => "evaluating",
            SchedulerState::Sleeping => "sleeping",
            SchedulerState::Backoff => "backoff",
            SchedulerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every candidate was attempted
    Completed,
    /// Universe fetch failed; nothing was evaluated
    Backoff,
    /// Shutdown was requested before all candidates started
    Interrupted,
}

/// Summary of one scan cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub candidates: usize,
    pub symbols_evaluated: usize,
    pub symbols_failed: usize,
    pub signals: usize,
    pub alerts_sent: usize,
    pub alerts_suppressed: usize,
    pub alerts_failed: usize,
}

impl CycleReport {
    pub(crate) fn new(outcome: CycleOutcome) -> Self {
        Self {
            outcome,
            candidates: 0,
            symbols_evaluated: 0,
            symbols_failed: 0,
            signals: 0,
            alerts_sent: 0,
            alerts_suppressed: 0,
            alerts_failed: 0,
        }
    }
}

/// Per-symbol tally folded into the cycle report
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SymbolTally {
    pub failed: bool,
    pub signals: usize,
    pub sent: usize,
    pub suppressed: usize,
    pub notify_failed: usize,
}

/// Everything the scheduler needs from configuration
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub poll_interval: Duration,
    pub per_symbol_delay: Duration,
    pub backoff: Duration,
    pub symbol_timeout: Duration,
    pub max_concurrent_symbols: usize,
    pub candle_limit: usize,
    pub cooldown: chrono::Duration,
    pub cooldown_scope: CooldownScope,
    /// Address passed to the notifier with every alert
    pub destination: String,
    pub level_window: usize,
    pub level_delta: f64,
    pub universe: UniverseFilter,
    pub evaluators: EvaluatorParams,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        let mut evaluators = EvaluatorParams::default();
        evaluators.liquidity.profile_bins = config.levels.profile_bins;

        Self {
            poll_interval: Duration::from_secs(config.scanner.poll_interval_seconds),
            per_symbol_delay: Duration::from_secs_f64(
                config
                    .scanner
                    .per_symbol_delay_seconds
                    .max(0.0)
                    .min(MAX_PER_SYMBOL_DELAY_SECONDS),
            ),
            backoff: Duration::from_secs(config.scanner.backoff_seconds),
            symbol_timeout: Duration::from_secs(config.scanner.symbol_timeout_seconds),
            max_concurrent_symbols: config.scanner.max_concurrent_symbols.max(1),
            candle_limit: config.feed.candle_limit,
            cooldown: chrono::Duration::seconds(
                config.alerts.cooldown_seconds.min(u64::from(u32::MAX)) as i64,
            ),
            cooldown_scope: config.alerts.cooldown_scope,
            destination: config
                .notifier
                .destination
                .clone()
                .unwrap_or_else(|| "log".to_string()),
            level_window: config.levels.window,
            level_delta: config.levels.delta,
            universe: config.universe.clone(),
            evaluators,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unvalidated_delay_is_clamped() {
        let mut config = Config::default();
        config.scanner.per_symbol_delay_seconds = 1e30;
        let settings = SchedulerSettings::from_config(&config);
        assert_eq!(settings.per_symbol_delay, Duration::from_secs(3600));

        config.scanner.per_symbol_delay_seconds = f64::NAN;
        let settings = SchedulerSettings::from_config(&config);
        assert_eq!(settings.per_symbol_delay, Duration::ZERO);
    }
}
