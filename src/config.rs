//! Configuration types for market-radar

use crate::alert::CooldownScope;
use crate::feed::BINANCE_API_URL;
use crate::levels::{DEFAULT_DELTA, DEFAULT_WINDOW};
use crate::profile::DEFAULT_BINS;
use crate::universe::UniverseFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Longest accepted pause between two symbols
pub const MAX_PER_SYMBOL_DELAY_SECONDS: f64 = 3600.0;

/// Configuration load and validation errors; fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure
///
/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub universe: UniverseFilter,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub levels: LevelsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Exchange REST feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shared request budget across all symbols; 0 disables pacing
    #[serde(default = "default_max_rps")]
    pub max_requests_per_second: u32,

    /// Candles fetched per series
    #[serde(default = "default_candle_limit")]
    pub candle_limit: usize,
}

fn default_base_url() -> String {
    BINANCE_API_URL.to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_max_rps() -> u32 {
    10
}
fn default_candle_limit() -> usize {
    200
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_requests_per_second: default_max_rps(),
            candle_limit: default_candle_limit(),
        }
    }
}

/// Polling loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Pause between completed cycles (seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Pause after each symbol (seconds)
    #[serde(default = "default_per_symbol_delay")]
    pub per_symbol_delay_seconds: f64,

    /// Pause after a failed universe fetch (seconds)
    #[serde(default = "default_backoff")]
    pub backoff_seconds: u64,

    /// Upper bound on fetching and evaluating one symbol (seconds)
    #[serde(default = "default_symbol_timeout")]
    pub symbol_timeout_seconds: u64,

    /// Symbols evaluated concurrently
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_symbols: usize,
}

fn default_poll_interval() -> u64 {
    300
}
fn default_per_symbol_delay() -> f64 {
    0.5
}
fn default_backoff() -> u64 {
    60
}
fn default_symbol_timeout() -> u64 {
    30
}
fn default_max_concurrent() -> usize {
    1
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            per_symbol_delay_seconds: default_per_symbol_delay(),
            backoff_seconds: default_backoff(),
            symbol_timeout_seconds: default_symbol_timeout(),
            max_concurrent_symbols: default_max_concurrent(),
        }
    }
}

/// Alert cooldown configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertConfig {
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u64,

    #[serde(default)]
    pub cooldown_scope: CooldownScope,
}

fn default_cooldown() -> u64 {
    3600
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown(),
            cooldown_scope: CooldownScope::default(),
        }
    }
}

/// Alert sink
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Log,
    Webhook,
}

/// Notifier configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,

    /// Chat id or channel the alerts are addressed to
    #[serde(default)]
    pub destination: Option<String>,

    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Level detection and volume profile configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LevelsConfig {
    /// Extrema window on each side
    #[serde(default = "default_level_window")]
    pub window: usize,

    /// Relative merge distance
    #[serde(default = "default_level_delta")]
    pub delta: f64,

    #[serde(default = "default_profile_bins")]
    pub profile_bins: usize,
}

fn default_level_window() -> usize {
    DEFAULT_WINDOW
}
fn default_level_delta() -> f64 {
    DEFAULT_DELTA
}
fn default_profile_bins() -> usize {
    DEFAULT_BINS
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            delta: DEFAULT_DELTA,
            profile_bins: DEFAULT_BINS,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject settings the scanner cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.universe.top_n_symbols == 0 {
            return invalid("universe.top_n_symbols must be at least 1");
        }
        if self.universe.quote_asset.is_empty() {
            return invalid("universe.quote_asset must not be empty");
        }
        if self.levels.window == 0 {
            return invalid("levels.window must be at least 1");
        }
        if !(self.levels.delta.is_finite() && self.levels.delta >= 0.0) {
            return invalid("levels.delta must be a non-negative number");
        }
        if self.levels.profile_bins == 0 {
            return invalid("levels.profile_bins must be at least 1");
        }
        if self.feed.candle_limit == 0 || self.feed.candle_limit > 1000 {
            return invalid("feed.candle_limit must be between 1 and 1000");
        }
        if self.scanner.max_concurrent_symbols == 0 {
            return invalid("scanner.max_concurrent_symbols must be at least 1");
        }
        if self.scanner.symbol_timeout_seconds == 0 {
            return invalid("scanner.symbol_timeout_seconds must be at least 1");
        }
        if !(0.0..=MAX_PER_SYMBOL_DELAY_SECONDS).contains(&self.scanner.per_symbol_delay_seconds) {
            return invalid("scanner.per_symbol_delay_seconds must be between 0 and 3600");
        }
        if self.notifier.kind == NotifierKind::Webhook {
            if self.notifier.webhook_url.as_deref().map_or(true, str::is_empty) {
                return invalid("notifier.webhook_url is required for the webhook notifier");
            }
            if self.notifier.destination.as_deref().map_or(true, str::is_empty) {
                return invalid("notifier.destination is required for the webhook notifier");
            }
        }
        Ok(())
    }
}
