//! Outbound request rate limiting

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;

/// Spaces outbound calls evenly so at most `max_per_second` start per second
///
/// Shared by every task that talks to the upstream API. The quota allows a
/// burst of one, so calls are spread across the second rather than bunched
/// at its start.
pub struct RateLimiter {
    limiter: Option<DefaultDirectRateLimiter>,
    spacing: Duration,
}

impl RateLimiter {
    /// Create a limiter; zero disables limiting
    pub fn new(max_per_second: u32) -> Self {
        match NonZeroU32::new(max_per_second) {
            Some(rate) => {
                let quota = Quota::per_second(rate).allow_burst(NonZeroU32::MIN);
                Self {
                    spacing: quota.replenish_interval(),
                    limiter: Some(DefaultDirectRateLimiter::direct(quota)),
                }
            }
            None => Self::unlimited(),
        }
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self {
            limiter: None,
            spacing: Duration::ZERO,
        }
    }

    /// Minimum gap between two calls
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Wait for the next free slot
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
