//! Traffic capture around every network call.
//!
//! [`CapturingTransport`] decorates any [`Transport`] and hands each exchange
//! to a [`Recorder`]. The default client path never builds one, so capture
//! costs nothing unless requested. [`HarRecorder`] archives a session as an
//! HTTP Archive (HAR 1.2) file.

mod har;

pub use har::{
    HarCreator, HarEntry, HarHeader, HarLog, HarRecorder, HarRequest, HarResponse, HarRoot,
};

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One request/response pair as seen by the transport.
#[derive(Debug, Clone)]
pub struct CapturedExchange {
    pub started: DateTime<Utc>,
    pub elapsed: Duration,
    pub request: HttpRequest,
    /// Request headers as sent on the wire (cookie engine output included)
    /// when the transport reports them, else those of `request`.
    pub request_headers: Vec<(String, String)>,
    /// `None` when no response arrived.
    pub status: Option<u32>,
    pub response_headers: Vec<String>,
    /// Body bytes received (for streams: bytes handed to the sink).
    pub body_size: u64,
    /// Transport error message, if the exchange failed.
    pub error: Option<String>,
}

/// Receives captured exchanges.
pub trait Recorder {
    fn record(&mut self, exchange: CapturedExchange);
}

impl<R: Recorder + ?Sized> Recorder for Box<R> {
    fn record(&mut self, exchange: CapturedExchange) {
        (**self).record(exchange);
    }
}

/// Keeps exchanges in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    exchanges: Arc<Mutex<Vec<CapturedExchange>>>,
}

impl MemoryRecorder {
    pub fn exchanges(&self) -> Vec<CapturedExchange> {
        self.exchanges
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Recorder for MemoryRecorder {
    fn record(&mut self, exchange: CapturedExchange) {
        if let Ok(mut v) = self.exchanges.lock() {
            v.push(exchange);
        }
    }
}

/// Transport decorator that records every call.
pub struct CapturingTransport<T, R> {
    inner: T,
    recorder: R,
}

impl<T: Transport, R: Recorder> CapturingTransport<T, R> {
    pub fn new(inner: T, recorder: R) -> Self {
        Self { inner, recorder }
    }
}

/// Counts bytes passing through to the caller's sink.
struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    count: u64,
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<T: Transport, R: Recorder> CapturingTransport<T, R> {
    fn request_headers(&self, req: &HttpRequest) -> Vec<(String, String)> {
        let sent = self.inner.sent_headers();
        if sent.is_empty() {
            req.headers.clone()
        } else {
            sent
        }
    }
}

impl<T: Transport, R: Recorder> Transport for CapturingTransport<T, R> {
    fn get(&mut self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let started = Utc::now();
        let clock = Instant::now();
        let result = self.inner.get(req);
        let mut exchange = CapturedExchange {
            started,
            elapsed: clock.elapsed(),
            request: req.clone(),
            request_headers: self.request_headers(req),
            status: None,
            response_headers: Vec::new(),
            body_size: 0,
            error: None,
        };
        match &result {
            Ok(resp) => {
                exchange.status = Some(resp.status);
                exchange.response_headers = resp.headers.clone();
                exchange.body_size = resp.body.len() as u64;
            }
            Err(e) => exchange.error = Some(e.to_string()),
        }
        self.recorder.record(exchange);
        result
    }

    fn stream(&mut self, req: &HttpRequest, sink: &mut dyn Write) -> Result<u32, TransportError> {
        let started = Utc::now();
        let clock = Instant::now();
        let mut counting = CountingWriter { inner: sink, count: 0 };
        let result = self.inner.stream(req, &mut counting);
        let (status, error) = match &result {
            Ok(status) => (Some(*status), None),
            Err(e) => (None, Some(e.to_string())),
        };
        self.recorder.record(CapturedExchange {
            started,
            elapsed: clock.elapsed(),
            request: req.clone(),
            request_headers: self.request_headers(req),
            status,
            response_headers: Vec::new(),
            body_size: counting.count,
            error,
        });
        result
    }

    fn sent_headers(&self) -> Vec<(String, String)> {
        self.inner.sent_headers()
    }
}
