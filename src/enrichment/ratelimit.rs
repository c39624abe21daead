//! Request pacing and retry backoff.
//!
//! Each provider owns one [`RateLimiter`] shared by every concurrent caller
//! (it lives behind an `Arc` inside the provider's HTTP executor), so the
//! per-provider budget holds no matter how many records are in flight.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::{ProviderSettings, RetryConfig};

/// Sliding-window limiter: at most `max_requests` grants in any `window`.
///
/// Waiters queue on an async mutex (FIFO) and sleep until the oldest grant
/// leaves the window, so there is no polling.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max_requests = max_requests.max(1) as usize;
        Self {
            max_requests,
            window,
            grants: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Limiter from a provider's config section
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(settings.requests, settings.window())
    }

    /// Wait until a request slot is free and claim it
    pub async fn acquire(&self) {
        let mut grants = self.grants.lock().await;

        loop {
            let now = Instant::now();
            while let Some(&oldest) = grants.front() {
                if now.duration_since(oldest) >= self.window {
                    grants.pop_front();
                } else {
                    break;
                }
            }

            if grants.len() < self.max_requests {
                grants.push_back(now);
                return;
            }

            // Window is full; the front entry is the next to expire
            if let Some(&oldest) = grants.front() {
                tokio::time::sleep_until(oldest + self.window).await;
            }
        }
    }
}

/// Exponential backoff with a capped delay and a capped attempt count.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            multiplier: config.multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Delay before the retry that follows failed attempt number `attempt`
    /// (zero-based): `base * multiplier^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let millis = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Delay honoring a server-provided `Retry-After`, still capped
    pub fn delay_with_hint(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.delay_for(attempt);
        match retry_after {
            Some(hint) => backoff.max(hint).min(self.max_delay),
            None => backoff,
        }
    }

    /// Whether another attempt is allowed after `attempt` (zero-based) failed
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}
