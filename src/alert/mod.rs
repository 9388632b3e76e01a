//! Alert module
//!
//! Cooldown-based suppression and delivery of actionable signals

mod dedup;
mod notifier;

pub use dedup::{AlertDeduplicator, CooldownScope, DedupKey};
pub use notifier::{AnyNotifier, LogNotifier, Notifier, NotifyError, WebhookNotifier};
