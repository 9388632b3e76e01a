//! Scan command implementation

use super::{build_notifier, build_source};
use crate::alert::{AnyNotifier, LogNotifier};
use crate::config::Config;
use crate::scanner::{CycleOutcome, PollingScheduler, SchedulerSettings};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Log alerts instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

impl ScanArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let notifier = if self.dry_run {
            AnyNotifier::Log(LogNotifier)
        } else {
            build_notifier(config)?
        };
        let scheduler = PollingScheduler::new(
            build_source(config)?,
            Arc::new(notifier),
            SchedulerSettings::from_config(config),
        );

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let report = scheduler.run_cycle(&shutdown_rx).await;

        println!("Scan {:?}", report.outcome);
        println!("  Candidates:  {}", report.candidates);
        println!("  Evaluated:   {}", report.symbols_evaluated);
        println!("  Failed:      {}", report.symbols_failed);
        println!("  Signals:     {}", report.signals);
        println!(
            "  Alerts:      {} sent, {} suppressed, {} failed",
            report.alerts_sent, report.alerts_suppressed, report.alerts_failed
        );

        if report.outcome == CycleOutcome::Backoff {
            anyhow::bail!("Universe fetch failed");
        }
        Ok(())
    }
}
