//! libcurl transport on one persistent easy handle.
//!
//! Reusing the handle keeps the cookie engine alive, so cookies set by
//! responses are sent on later requests. TLS is verified against the pinned
//! chain given at construction, never the platform trust store.

use super::{parse_request_head, parse_status_line, CookieJar, HttpRequest, HttpResponse, Transport, TransportError};
use crate::error::ConfigError;
use curl::easy::{Easy, InfoType, List};
use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::str;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: u32 = 10;

/// Blocking transport backed by `curl::easy::Easy`.
pub struct CurlTransport {
    easy: Easy,
    trace_sent: bool,
    sent: Vec<(String, String)>,
}

impl std::fmt::Debug for CurlTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurlTransport").finish_non_exhaustive()
    }
}

impl CurlTransport {
    /// Create a transport pinned to the PEM chain at `ca_bundle`, seeded with
    /// the caller's cookies.
    pub fn new(ca_bundle: &Path, cookies: Option<&CookieJar>) -> Result<Self, ConfigError> {
        if !ca_bundle.is_file() {
            return Err(ConfigError::MissingCaBundle(ca_bundle.to_path_buf()));
        }

        let mut easy = Easy::new();
        easy.cainfo(ca_bundle)?;
        easy.ssl_verify_peer(true)?;
        easy.ssl_verify_host(true)?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;
        // Empty file name turns the cookie engine on without reading anything.
        easy.cookie_file("")?;
        if let Some(jar) = cookies {
            for line in jar.netscape_lines() {
                easy.cookie_list(&line)?;
            }
        }

        Ok(Self {
            easy,
            trace_sent: false,
            sent: Vec::new(),
        })
    }

    /// Watch outgoing request heads so [`Transport::sent_headers`] can report
    /// them. Off by default; turned on when traffic is captured.
    pub fn trace_sent_headers(mut self, on: bool) -> Self {
        self.trace_sent = on;
        self
    }

    fn prepare(&mut self, req: &HttpRequest) -> Result<(), curl::Error> {
        self.easy.url(&req.url)?;
        self.easy.get(true)?;
        self.easy.follow_location(req.follow_redirects)?;
        if req.follow_redirects {
            self.easy.max_redirections(MAX_REDIRECTS)?;
        }
        // Zero disables the overall timeout.
        self.easy.timeout(req.timeout.unwrap_or(Duration::ZERO))?;
        // The debug callback only fires in verbose mode.
        self.easy.verbose(self.trace_sent)?;

        let mut list = List::new();
        for (k, v) in &req.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        self.easy.http_headers(list)?;
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn get(&mut self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.clear();
        self.prepare(req)?;

        let trace = self.trace_sent;
        let mut sent: Vec<(String, String)> = Vec::new();
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        let result = {
            let mut transfer = self.easy.transfer();
            if trace {
                transfer.debug_function(|kind, data| {
                    if let InfoType::HeaderOut = kind {
                        sent = parse_request_head(data);
                    }
                })?;
            }
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let s = s.trim_end();
                    if !s.is_empty() {
                        headers.push(s.to_string());
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()
        };
        self.sent = sent;
        result?;

        let status = self.easy.response_code()?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn stream(&mut self, req: &HttpRequest, sink: &mut dyn Write) -> Result<u32, TransportError> {
        self.sent.clear();
        self.prepare(req)?;

        let trace = self.trace_sent;
        let mut sent: Vec<(String, String)> = Vec::new();

        // Last status line seen; with redirects followed, that of the final hop.
        let status = Cell::new(0u32);
        let mut sink_error: Option<std::io::Error> = None;
        let result = {
            let mut transfer = self.easy.transfer();
            if trace {
                // Redirect hops each send a head; the last one wins.
                transfer.debug_function(|kind, data| {
                    if let InfoType::HeaderOut = kind {
                        sent = parse_request_head(data);
                    }
                })?;
            }
            transfer.header_function(|data| {
                if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                if !(200..300).contains(&status.get()) {
                    // Error bodies are drained, never handed to the sink.
                    return Ok(data.len());
                }
                match sink.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };
        self.sent = sent;

        if let Err(e) = result {
            if let Some(io_err) = sink_error {
                return Err(TransportError::Sink(io_err));
            }
            return Err(e.into());
        }
        Ok(self.easy.response_code()?)
    }

    fn sent_headers(&self) -> Vec<(String, String)> {
        self.sent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_ca_bundle_rejected_at_construction() {
        let err = CurlTransport::new(Path::new("/nonexistent/chain.pem"), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCaBundle(_)));
    }

    #[test]
    fn builds_with_bundle_and_cookies() {
        let mut pem = NamedTempFile::new().unwrap();
        writeln!(pem, "-----BEGIN CERTIFICATE-----").unwrap();
        pem.flush().unwrap();
        let mut jar = CookieJar::new();
        jar.insert(crate::transport::Cookie::new("T", "abc", ".yahoo.com"));
        assert!(CurlTransport::new(pem.path(), Some(&jar)).is_ok());
    }
}
