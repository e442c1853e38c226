//! Blanket request pacing.
//!
//! A fixed delay is slept before every network call, retries included. It
//! does not adapt to server feedback.

use crate::error::ConfigError;
use std::time::Duration;

/// Blocks the calling thread. Injected so pacing and backoff can be observed
/// without waiting in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Minimum delay before every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Build from a delay in seconds, as found in config files and flags.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::InvalidDelay(secs));
        }
        Duration::try_from_secs_f64(secs)
            .map(Self::new)
            .map_err(|_| ConfigError::InvalidDelay(secs))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the configured delay. A zero delay does not call the sleeper.
    pub fn pace(&self, sleeper: &dyn Sleeper) {
        if !self.delay.is_zero() {
            sleeper.sleep(self.delay);
        }
    }
}
