//! Classify HTTP statuses and transport errors into taxonomy kinds.

use super::error::AttemptError;
use super::policy::ErrorKind;
use crate::transport::TransportError;

/// Classify a non-200 HTTP status.
///
/// 307 shows up when the session expired and the API redirects to the login
/// page; redirects are not followed, so it is reported here instead.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        307 | 401 | 403 => ErrorKind::Authentication,
        404 => ErrorKind::NotFound,
        _ => ErrorKind::Recoverable,
    }
}

/// Classify a curl error: timeouts and connection-level failures are transient.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Recoverable;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Recoverable;
    }
    ErrorKind::Unrecoverable
}

pub fn classify_transport_error(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Curl(ce) => classify_curl_error(ce),
        TransportError::Connection(_) | TransportError::Timeout(_) => ErrorKind::Recoverable,
        TransportError::Sink(_) => ErrorKind::Unrecoverable,
    }
}

/// Classify a failed attempt.
pub fn classify(e: &AttemptError) -> ErrorKind {
    match e {
        AttemptError::Transport(te) => classify_transport_error(te),
        AttemptError::Status { status, .. } => classify_http_status(*status),
        AttemptError::Malformed { .. } => ErrorKind::Unrecoverable,
    }
}

/// Best-effort extraction of `ygError` from an error body. Malformed JSON or a
/// missing field yields `None`.
pub fn extract_yg_error(body: &[u8]) -> Option<serde_json::Value> {
    let mut value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get_mut("ygError").map(serde_json::Value::take)
}
