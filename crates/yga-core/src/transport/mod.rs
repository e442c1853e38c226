//! Blocking HTTP transport.
//!
//! The engine only talks to the network through [`Transport`]. The default
//! implementation is [`CurlTransport`]; traffic capture wraps any transport in
//! [`crate::capture::CapturingTransport`].

mod cookies;
mod easy;

pub use self::cookies::{Cookie, CookieJar, DEFAULT_COOKIE_DOMAIN};
pub use self::easy::CurlTransport;

use std::io::Write;
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to each JSON fetch.
pub const JSON_TIMEOUT: Duration = Duration::from_secs(15);

/// One GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    pub follow_redirects: bool,
    /// `None` means no overall timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// JSON API call: redirects are reported, not followed; 15 s timeout.
    pub fn json(url: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers,
            follow_redirects: false,
            timeout: Some(JSON_TIMEOUT),
        }
    }

    /// Byte download: redirects followed, no timeout.
    pub fn download(url: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers,
            follow_redirects: true,
            timeout: None,
        }
    }
}

/// A fully buffered response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    /// Raw header lines (status lines included), without line terminators.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure: no usable response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("timed out: {0}")]
    Timeout(String),
    /// The caller's sink rejected body bytes.
    #[error("sink write failed: {0}")]
    Sink(#[source] std::io::Error),
}

/// Sends GET requests. Implementations may keep state (cookies) across calls.
pub trait Transport {
    /// Send `req` and buffer the whole response.
    fn get(&mut self, req: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Send `req` and stream the body into `sink`, returning the final status.
    /// Body bytes reach `sink` only when that status is 2xx.
    fn stream(&mut self, req: &HttpRequest, sink: &mut dyn Write) -> Result<u32, TransportError>;

    /// Request headers of the last call as they went on the wire, cookies
    /// included. Empty when the implementation cannot observe them.
    fn sent_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&mut self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).get(req)
    }

    fn stream(&mut self, req: &HttpRequest, sink: &mut dyn Write) -> Result<u32, TransportError> {
        (**self).stream(req, sink)
    }

    fn sent_headers(&self) -> Vec<(String, String)> {
        (**self).sent_headers()
    }
}

/// Status code from an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 404`).
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Header fields of an outgoing request head; the request line is skipped.
pub(crate) fn parse_request_head(data: &[u8]) -> Vec<(String, String)> {
    String::from_utf8_lossy(data)
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line("HTTP/2 404"), Some(404));
        assert_eq!(parse_status_line("Content-Length: 12"), None);
        assert_eq!(parse_status_line("HTTP/1.1 abc"), None);
    }

    #[test]
    fn request_head_fields() {
        let head = b"GET /v1/groups/g/ HTTP/1.1\r\nHost: groups.yahoo.com\r\nCookie: T=abc; Y=d\r\nReferer: https://groups.yahoo.com/api\r\n\r\n";
        assert_eq!(
            parse_request_head(head),
            vec![
                ("Host".to_string(), "groups.yahoo.com".to_string()),
                ("Cookie".to_string(), "T=abc; Y=d".to_string()),
                ("Referer".to_string(), "https://groups.yahoo.com/api".to_string()),
            ]
        );
    }

    #[test]
    fn request_presets() {
        let j = HttpRequest::json("https://x/api", vec![]);
        assert!(!j.follow_redirects);
        assert_eq!(j.timeout, Some(JSON_TIMEOUT));
        let d = HttpRequest::download("https://x/f", vec![]);
        assert!(d.follow_redirects);
        assert_eq!(d.timeout, None);
    }
}
