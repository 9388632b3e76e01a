//! CLI interface for market-radar
//!
//! Provides subcommands for:
//! - `run`: Poll the market until interrupted
//! - `scan`: Run a single scan cycle
//! - `levels`: Show support/resistance and volume nodes for one symbol
//! - `config`: Show the effective configuration

mod levels;
mod run;
mod scan;

pub use levels::LevelsArgs;
pub use run::RunArgs;
pub use scan::ScanArgs;

use crate::alert::{AnyNotifier, LogNotifier, WebhookNotifier};
use crate::config::{Config, NotifierKind};
use crate::feed::{BinanceClient, RateLimiter};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "market-radar")]
#[command(about = "Market-structure signal scanner for crypto spot symbols")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the market until Ctrl-C
    Run(RunArgs),
    /// Run a single scan cycle
    Scan(ScanArgs),
    /// Show levels and volume nodes for a symbol
    Levels(LevelsArgs),
    /// Show the effective configuration
    Config,
}

/// Exchange client with the shared request budget
pub(crate) fn build_source(config: &Config) -> anyhow::Result<Arc<BinanceClient>> {
    let limiter = Arc::new(RateLimiter::new(config.feed.max_requests_per_second));
    let client = BinanceClient::new(&config.feed, limiter).context("Failed to build exchange client")?;
    Ok(Arc::new(client))
}

/// Notifier selected by `[notifier] kind`
pub(crate) fn build_notifier(config: &Config) -> anyhow::Result<AnyNotifier> {
    match config.notifier.kind {
        NotifierKind::Log => Ok(AnyNotifier::Log(LogNotifier)),
        NotifierKind::Webhook => {
            let url = config
                .notifier
                .webhook_url
                .as_deref()
                .context("notifier.webhook_url is not set")?;
            let notifier = WebhookNotifier::new(
                url,
                Duration::from_secs(config.feed.request_timeout_secs),
            )?;
            Ok(AnyNotifier::Webhook(notifier))
        }
    }
}
