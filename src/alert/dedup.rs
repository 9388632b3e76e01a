//! Alert cooldown tracking

use crate::signal::{Signal, SignalType};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Granularity of the alert cooldown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownScope {
    /// One alert per symbol per window, whatever the signal kind
    #[default]
    Symbol,
    /// One alert per (symbol, signal kind) per window
    SymbolAndType,
}

/// Cooldown table key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub symbol: String,
    pub signal_type: Option<SignalType>,
}

impl DedupKey {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            signal_type: None,
        }
    }

    pub fn for_signal(scope: CooldownScope, signal: &Signal) -> Self {
        Self {
            symbol: signal.symbol.clone(),
            signal_type: match scope {
                CooldownScope::Symbol => None,
                CooldownScope::SymbolAndType => Some(signal.signal_type()),
            },
        }
    }
}

/// Suppresses repeat alerts inside a cooldown window
///
/// In-memory only; restarts begin with an empty table.
#[derive(Debug, Default)]
pub struct AlertDeduplicator {
    last_sent: Mutex<HashMap<DedupKey, DateTime<Utc>>>,
}

impl AlertDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set: true (and record `now`) unless `key` alerted less
    /// than `window` before `now`
    pub fn should_notify(&self, key: &DedupKey, now: DateTime<Utc>, window: Duration) -> bool {
        let mut table = self
            .last_sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = table.get(key) {
            if now.signed_duration_since(*last) < window {
                return false;
            }
        }
        table.insert(key.clone(), now);
        true
    }

    /// Drop entries whose window has elapsed; returns how many went
    pub fn prune(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let mut table = self
            .last_sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = table.len();
        table.retain(|_, last| now.signed_duration_since(*last) < window);
        before - table.len()
    }

    pub fn len(&self) -> usize {
        self.last_sent
            .lock()
            .map(|t| t.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
