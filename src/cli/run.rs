//! Run command implementation

use super::{build_notifier, build_source};
use crate::alert::{AnyNotifier, LogNotifier};
use crate::config::Config;
use crate::scanner::{PollingScheduler, SchedulerSettings};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log alerts instead of sending them, whatever the config says
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source = build_source(config)?;
        let notifier = if self.dry_run {
            AnyNotifier::Log(LogNotifier)
        } else {
            build_notifier(config)?
        };
        let scheduler = PollingScheduler::new(
            source,
            Arc::new(notifier),
            SchedulerSettings::from_config(config),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctrl_c = async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        };

        tokio::join!(scheduler.run(shutdown_rx), ctrl_c);

        Ok(())
    }
}
