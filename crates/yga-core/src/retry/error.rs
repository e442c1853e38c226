//! Failure of a single attempt, before classification.

use crate::transport::TransportError;
use std::fmt;

/// What went wrong on one attempt. Classified into an
/// [`ErrorKind`](super::ErrorKind) so the run loop can decide whether to retry.
#[derive(Debug)]
pub enum AttemptError {
    /// No usable response (connection refused, timeout, TLS, ...).
    Transport(TransportError),
    /// Response arrived with a status other than 200. Redirects are not
    /// followed on the JSON path, so 3xx responses land here as well.
    Status {
        status: u32,
        yg_error: Option<serde_json::Value>,
    },
    /// 200 response whose body is not the expected envelope.
    Malformed { status: u32, reason: String },
}

impl AttemptError {
    pub fn status(&self) -> Option<u32> {
        match self {
            AttemptError::Transport(_) => None,
            AttemptError::Status { status, .. } | AttemptError::Malformed { status, .. } => {
                Some(*status)
            }
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(e) => write!(f, "{}", e),
            AttemptError::Status { status, yg_error: Some(yg) } => {
                write!(f, "HTTP {} ygError={}", status, yg)
            }
            AttemptError::Status { status, yg_error: None } => write!(f, "HTTP {}", status),
            AttemptError::Malformed { status, reason } => {
                write!(f, "HTTP {} with malformed envelope: {}", status, reason)
            }
        }
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttemptError::Transport(e) => Some(e),
            AttemptError::Status { .. } | AttemptError::Malformed { .. } => None,
        }
    }
}
