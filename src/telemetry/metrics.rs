//! Prometheus metrics

use crate::signal::SignalType;
use ::metrics::{counter, gauge, histogram};
use std::net::SocketAddr;
use std::time::Duration;

/// Alert dispatch outcome
#[derive(Debug, Clone, Copy)]
pub enum AlertOutcome {
    Sent,
    /// Inside the cooldown window
    Suppressed,
    /// Notifier returned an error
    Failed,
}

/// Install the Prometheus exporter on `0.0.0.0:port`
///
/// Must be called from inside a tokio runtime.
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished scan cycle
pub fn record_cycle(duration: Duration) {
    counter!("radar_cycles_total").increment(1);
    histogram!("radar_cycle_duration_seconds").record(duration.as_secs_f64());
}

/// Record a universe fetch failure
pub fn record_backoff() {
    counter!("radar_backoffs_total").increment(1);
}

/// Set the number of symbols selected this cycle
pub fn set_candidates(count: usize) {
    gauge!("radar_candidate_symbols").set(count as f64);
}

/// Record one symbol's evaluation result
pub fn record_symbol(failed: bool) {
    if failed {
        counter!("radar_symbols_failed_total").increment(1);
    } else {
        counter!("radar_symbols_evaluated_total").increment(1);
    }
}

/// Record a produced signal
pub fn record_signal(signal_type: SignalType) {
    counter!("radar_signals_total", "type" => signal_type.as_str()).increment(1);
}

/// Record an alert dispatch decision
pub fn record_alert(outcome: AlertOutcome) {
    let name = match outcome {
        AlertOutcome::Sent => "radar_alerts_sent_total",
        AlertOutcome::Suppressed => "radar_alerts_suppressed_total",
        AlertOutcome::Failed => "radar_alerts_failed_total",
    };
    counter!(name).increment(1);
}
