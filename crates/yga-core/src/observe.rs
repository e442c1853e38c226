//! Observability sink injected into the client.
//!
//! The engine reports retry and classification boundaries through an
//! [`Observer`] rather than a global logger. [`TracingObserver`] forwards the
//! events to `tracing`, which is what callers get unless they inject their own.

use crate::retry::{AttemptError, ErrorKind};
use std::time::Duration;

/// Receives engine events. All methods default to no-ops.
pub trait Observer {
    /// An attempt failed and was classified (warning level).
    fn attempt_failed(
        &self,
        _uri: &str,
        _attempt: u32,
        _max_attempts: u32,
        _kind: ErrorKind,
        _error: &AttemptError,
    ) {
    }

    /// About to sleep before attempt `next_attempt` (0-based).
    fn retrying(&self, _uri: &str, _next_attempt: u32, _delay: Duration) {}

    /// Download got HTTP 400 and will pause before trying again.
    fn download_retry(&self, _url: &str, _remaining: u32, _pause: Duration) {}
}

/// Emits engine events as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn attempt_failed(
        &self,
        uri: &str,
        attempt: u32,
        max_attempts: u32,
        kind: ErrorKind,
        error: &AttemptError,
    ) {
        tracing::warn!(
            uri,
            attempt = attempt + 1,
            max_attempts,
            ?kind,
            "attempt failed: {}",
            error
        );
        if let Some(source) = std::error::Error::source(error) {
            tracing::debug!(uri, "failure detail: {:?}", source);
        }
    }

    fn retrying(&self, uri: &str, next_attempt: u32, delay: Duration) {
        tracing::info!(
            uri,
            attempt = next_attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "backing off before retry"
        );
    }

    fn download_retry(&self, url: &str, remaining: u32, pause: Duration) {
        tracing::info!(
            url,
            remaining,
            pause_secs = pause.as_secs(),
            "got HTTP 400, will sleep and retry"
        );
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
