use rand::Rng;
use std::time::Duration;

/// Attempts per logical fetch, including the first.
pub const MAX_ATTEMPTS: u32 = 5;

/// Classification of a failed attempt.
///
/// `Authentication`, `NotFound` and `Unrecoverable` form the unrecoverable
/// family: retrying without outside intervention cannot change the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network blip, timeout, 5xx or unexpected status. Retried with backoff.
    Recoverable,
    /// 401/403, or a 307 redirect to the login page.
    Authentication,
    /// 404.
    NotFound,
    /// Anything else retrying cannot fix (malformed envelope, bad URL, ...).
    Unrecoverable,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Recoverable)
    }

    pub fn is_unrecoverable(self) -> bool {
        !self.is_retryable()
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay.
    RetryAfter(Duration),
    /// Error is not retryable; surface it now.
    FailFast,
    /// Retryable, but the attempt budget is spent.
    Exhausted,
}

/// Fixed exponential backoff with jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after attempt `attempt` (0-based) failed with `kind`.
    pub fn decide<R: Rng + ?Sized>(&self, attempt: u32, kind: ErrorKind, rng: &mut R) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::FailFast;
        }
        if attempt + 1 >= self.max_attempts {
            return RetryDecision::Exhausted;
        }
        RetryDecision::RetryAfter(backoff_delay(attempt, rng))
    }
}

/// Uniform random delay in `[2^attempt, 2^(attempt+1))` seconds, where
/// `attempt` is the 0-based index of the attempt that just failed.
pub fn backoff_delay<R: Rng + ?Sized>(attempt: u32, rng: &mut R) -> Duration {
    let low_ms = 1000u64 << attempt.min(20);
    let high_ms = low_ms * 2;
    Duration::from_millis(rng.gen_range(low_ms..high_ms))
}
