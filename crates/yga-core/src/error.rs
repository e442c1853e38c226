//! Error taxonomy returned by the fetch engine.
//!
//! Network failures collapse into four kinds so callers can decide between
//! retrying elsewhere, aborting, or treating a resource as gone without
//! inspecting strings. Resolution errors (unknown resource names) and
//! configuration errors stay separate: they never reach the network.

use crate::retry::ErrorKind;
use crate::transport::TransportError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Diagnostic context attached to every network-level failure.
#[derive(Debug, Clone, Default)]
pub struct Failure {
    /// Request URI (without query string).
    pub uri: String,
    /// Last HTTP status seen, if a response arrived at all.
    pub status: Option<u32>,
    /// Attempts performed, including the failing one.
    pub attempts: u32,
    /// `ygError` object from the error body, when the server sent one.
    pub yg_error: Option<serde_json::Value>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        write!(f, " after {} attempt(s)", self.attempts)?;
        if let Some(yg) = &self.yg_error {
            write!(f, ", ygError: {}", yg)?;
        }
        Ok(())
    }
}

/// Errors returned by [`GroupClient`](crate::client::GroupClient) calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Resource name has no API-version mapping. Raised before any I/O.
    #[error("unknown resource {0:?}")]
    UnknownResource(String),

    /// Path parts or base URI do not form a valid URL. Raised before any I/O.
    #[error("invalid request URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// Session or credentials rejected (401/403, or 307 redirect to login).
    #[error("authentication rejected: {0}")]
    Authentication(Failure),

    /// Resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(Failure),

    /// Transient failure that outlasted the attempt budget.
    #[error("giving up: {failure}")]
    Recoverable {
        failure: Failure,
        #[source]
        source: Option<TransportError>,
    },

    /// Transport failure that retrying cannot fix (bad URL, TLS setup, ...).
    #[error("request failed: {failure}")]
    Unrecoverable {
        failure: Failure,
        #[source]
        source: Option<TransportError>,
    },

    /// 200 response whose envelope lacks the payload field.
    #[error("malformed response from {failure}: {reason}")]
    MalformedResponse { failure: Failure, reason: String },

    /// Caller-supplied download sink failed.
    #[error("download sink: {0}")]
    Sink(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FetchError {
    /// Taxonomy kind. `None` for local errors that never reached the network.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FetchError::Authentication(_) => Some(ErrorKind::Authentication),
            FetchError::NotFound(_) => Some(ErrorKind::NotFound),
            FetchError::Recoverable { .. } => Some(ErrorKind::Recoverable),
            FetchError::Unrecoverable { .. } | FetchError::MalformedResponse { .. } => {
                Some(ErrorKind::Unrecoverable)
            }
            FetchError::UnknownResource(_)
            | FetchError::InvalidUri { .. }
            | FetchError::Sink(_)
            | FetchError::Config(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            FetchError::Authentication(f) | FetchError::NotFound(f) => Some(f),
            FetchError::Recoverable { failure, .. }
            | FetchError::Unrecoverable { failure, .. }
            | FetchError::MalformedResponse { failure, .. } => Some(failure),
            FetchError::UnknownResource(_)
            | FetchError::InvalidUri { .. }
            | FetchError::Sink(_)
            | FetchError::Config(_) => None,
        }
    }

    /// Last HTTP status, if any response was received.
    pub fn status(&self) -> Option<u32> {
        self.failure().and_then(|f| f.status)
    }

    /// Attempts performed before the error surfaced (0 for local errors).
    pub fn attempts(&self) -> u32 {
        self.failure().map_or(0, |f| f.attempts)
    }

    /// True when retrying later (e.g. against another mirror) may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::Recoverable { .. })
    }

    /// Build the terminal error for a classified failure.
    pub(crate) fn from_kind(
        kind: ErrorKind,
        failure: Failure,
        source: Option<TransportError>,
    ) -> Self {
        match kind {
            ErrorKind::Authentication => FetchError::Authentication(failure),
            ErrorKind::NotFound => FetchError::NotFound(failure),
            ErrorKind::Recoverable => FetchError::Recoverable { failure, source },
            ErrorKind::Unrecoverable => FetchError::Unrecoverable { failure, source },
        }
    }
}

/// Setup-time errors: raised while building a client, never during a call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("group name must not be empty")]
    EmptyGroup,

    #[error("delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidDelay(f64),

    #[error("invalid header {0:?}: expected NAME:VALUE")]
    InvalidHeader(String),

    #[error("pinned certificate chain not found at {}", .0.display())]
    MissingCaBundle(PathBuf),

    #[error("traffic capture requested but this build lacks the `capture` feature")]
    CaptureUnavailable,

    #[error("cannot open capture file {}: {source}", path.display())]
    CaptureFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read cookie file {}: {source}", path.display())]
    CookieFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("curl setup: {0}")]
    Curl(#[from] curl::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(status: Option<u32>, attempts: u32) -> Failure {
        Failure {
            uri: "https://groups.yahoo.com/api/v1/groups/g/messages".into(),
            status,
            attempts,
            yg_error: None,
        }
    }

    #[test]
    fn kinds_map_to_variants() {
        let e = FetchError::from_kind(ErrorKind::Authentication, failure(Some(401), 1), None);
        assert!(matches!(e, FetchError::Authentication(_)));
        assert_eq!(e.kind(), Some(ErrorKind::Authentication));
        assert_eq!(e.status(), Some(401));
        assert_eq!(e.attempts(), 1);

        let e = FetchError::from_kind(ErrorKind::Recoverable, failure(Some(503), 5), None);
        assert!(e.is_recoverable());
        assert_eq!(e.attempts(), 5);
    }

    #[test]
    fn local_errors_have_no_kind() {
        let e = FetchError::UnknownResource("photos".into());
        assert_eq!(e.kind(), None);
        assert_eq!(e.attempts(), 0);
        assert_eq!(e.status(), None);
    }

    #[test]
    fn display_carries_operator_context() {
        let mut f = failure(Some(503), 5);
        f.yg_error = Some(serde_json::json!({"hostname": "x"}));
        let msg = FetchError::Recoverable { failure: f, source: None }.to_string();
        assert!(msg.contains("/groups/g/messages"), "{msg}");
        assert!(msg.contains("HTTP 503"), "{msg}");
        assert!(msg.contains("5 attempt(s)"), "{msg}");
        assert!(msg.contains("ygError"), "{msg}");
    }
}
