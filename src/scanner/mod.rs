//! Scanner module
//!
//! Polling loop tying the feed, evaluators and alerting together

mod scheduler;
mod types;

pub use scheduler::{PollingScheduler, ScanError};
pub use types::{CycleOutcome, CycleReport, SchedulerSettings, SchedulerState};
