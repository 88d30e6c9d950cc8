//! Bounded polling used instead of fixed sleeps.
//!
//! A [`WaitPolicy`] is started into a [`Poller`]; callers probe their
//! condition, then call [`Poller::tick`] which sleeps for the next backoff
//! interval. `tick` returns `false` once the deadline has passed, so every
//! condition is probed at least once and never after the deadline.
//!
//! ```ignore
//! let mut poller = policy.start();
//! let found = loop {
//!     if driver.heading_visible("Dashboard").await? {
//!         break true;
//!     }
//!     if !poller.tick().await {
//!         break false;
//!     }
//! };
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Delay schedule between consecutive probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    Fixed {
        interval_ms: u64,
    },
    Exponential {
        initial_ms: u64,
        max_ms: u64,
        factor: u32,
    },
}

impl Backoff {
    /// Delay before probe number `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed { interval_ms } => Duration::from_millis(interval_ms),
            Backoff::Exponential {
                initial_ms,
                max_ms,
                factor,
            } => {
                let scale = u64::from(factor.max(1)).saturating_pow(attempt);
                Duration::from_millis(initial_ms.saturating_mul(scale).min(max_ms))
            }
        }
    }

    /// Every interval must be non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = match *self {
            Backoff::Fixed { interval_ms: 0 } => Some("interval_ms"),
            Backoff::Exponential { initial_ms: 0, .. } => Some("initial_ms"),
            Backoff::Exponential { max_ms: 0, .. } => Some("max_ms"),
            _ => None,
        };
        match zero {
            Some(field) => Err(ConfigError::Invalid(format!("backoff {} must be > 0", field))),
            None => Ok(()),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            initial_ms: 100,
            max_ms: 1_000,
            factor: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub backoff: Backoff,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, backoff: Backoff) -> Self {
        Self { timeout, backoff }
    }

    pub fn start(&self) -> Poller {
        Poller {
            deadline: Instant::now() + self.timeout,
            backoff: self.backoff,
            attempt: 0,
        }
    }
}

/// Running wait started from a [`WaitPolicy`]
#[derive(Debug)]
pub struct Poller {
    deadline: Instant,
    backoff: Backoff,
    attempt: u32,
}

impl Poller {
    /// Sleep until the next probe. Returns `false` when the wait is over.
    pub async fn tick(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }

        let delay = self.backoff.delay(self.attempt).min(self.deadline - now);
        self.attempt = self.attempt.saturating_add(1);
        tokio::time::sleep(delay).await;
        true
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}
