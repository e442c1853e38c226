//! Retry rule for raw byte downloads.
//!
//! Simpler than the JSON path: only HTTP 400 is retried, after a fixed pause
//! with no jitter. Any other failure surfaces on the attempt it happened.

use super::classify::{classify_http_status, classify_transport_error};
use super::policy::ErrorKind;
use crate::error::{FetchError, Failure};
use crate::observe::Observer;
use crate::pacer::Sleeper;
use crate::transport::TransportError;
use std::time::Duration;

/// Bounded retry on HTTP 400 for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadRetry {
    /// Retries after the first attempt.
    pub retries: u32,
    pub pause: Duration,
}

impl Default for DownloadRetry {
    fn default() -> Self {
        Self {
            retries: 5,
            pause: Duration::from_secs(5),
        }
    }
}

impl DownloadRetry {
    /// Run `attempt` (which returns the final HTTP status) until it yields a
    /// 2xx status or the rule gives up.
    pub fn run<F>(
        &self,
        url: &str,
        sleeper: &dyn Sleeper,
        observer: &dyn Observer,
        mut attempt: F,
    ) -> Result<(), FetchError>
    where
        F: FnMut() -> Result<u32, TransportError>,
    {
        let mut remaining = self.retries;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let status = match attempt() {
                Ok(status) => status,
                Err(TransportError::Sink(e)) => return Err(FetchError::Sink(e)),
                Err(e) => {
                    let failure = Failure {
                        uri: url.to_string(),
                        attempts,
                        ..Failure::default()
                    };
                    return Err(FetchError::from_kind(classify_transport_error(&e), failure, Some(e)));
                }
            };
            if (200..300).contains(&status) {
                return Ok(());
            }
            if status == 400 && remaining > 0 {
                observer.download_retry(url, remaining, self.pause);
                remaining -= 1;
                sleeper.sleep(self.pause);
                continue;
            }
            let kind = match status {
                400 => ErrorKind::Recoverable,
                other => classify_http_status(other),
            };
            let failure = Failure {
                uri: url.to_string(),
                status: Some(status),
                attempts,
                yg_error: None,
            };
            return Err(FetchError::from_kind(kind, failure, None));
        }
    }
}
