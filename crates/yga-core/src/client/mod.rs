//! Group client: the fetch surface over one session.
//!
//! A [`GroupClient`] is bound to one group. Each call builds its request,
//! paces, sends, classifies and retries on the calling thread; nothing is
//! cached, so repeating a call repeats the network exchange.

mod builder;
mod chunked;

pub use builder::{parse_header, ClientBuilder};
pub use chunked::CHUNK_SIZE;

use crate::endpoint::{RequestSpec, Resource};
use crate::error::FetchError;
use crate::observe::Observer;
use crate::pacer::{Pacer, Sleeper};
use crate::retry::{extract_yg_error, run_with_retry, AttemptError, DownloadRetry, RetryPolicy};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use chunked::ChunkedWriter;
use rand::RngCore;
use serde_json::Value;
use std::io::Write;

/// Envelope field carrying the payload.
const DATA_FIELD: &str = "ygData";

/// Persistent HTTP state shared by all calls of one client: transport (with
/// its cookies), headers and pacing delay.
pub(crate) struct Session {
    transport: Box<dyn Transport>,
    headers: Vec<(String, String)>,
    pacer: Pacer,
}

/// Client for one group.
pub struct GroupClient {
    group: String,
    base_uri: String,
    policy: RetryPolicy,
    download_retry: DownloadRetry,
    session: Session,
    sleeper: Box<dyn Sleeper>,
    observer: Box<dyn Observer>,
    rng: Box<dyn RngCore>,
}

impl std::fmt::Debug for GroupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupClient")
            .field("group", &self.group)
            .field("base_uri", &self.base_uri)
            .field("headers", &self.session.headers)
            .field("pacer", &self.session.pacer)
            .finish_non_exhaustive()
    }
}

impl GroupClient {
    pub fn builder(group: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(group)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Headers sent with every request (default `Referer` merged with extras).
    pub fn headers(&self) -> &[(String, String)] {
        &self.session.headers
    }

    /// Fetch a resource by registry name and return the envelope's payload.
    ///
    /// ```no_run
    /// # fn demo(yga: &mut yga_core::GroupClient) -> Result<(), yga_core::FetchError> {
    /// let _raw = yga.fetch("messages", [123.to_string(), "raw".into()], [("", ""); 0])?;
    /// let _page = yga.fetch("messages", Vec::<String>::new(), [("count", "50")])?;
    /// # Ok(()) }
    /// ```
    ///
    /// Unknown names fail with [`FetchError::UnknownResource`] before any I/O.
    pub fn fetch<P, Q, K, V>(&mut self, name: &str, parts: P, query: Q) -> Result<Value, FetchError>
    where
        P: IntoIterator,
        P::Item: ToString,
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let resource: Resource = name.parse()?;
        self.fetch_resource(resource, parts, query)
    }

    /// Typed variant of [`GroupClient::fetch`].
    pub fn fetch_resource<P, Q, K, V>(
        &mut self,
        resource: Resource,
        parts: P,
        query: Q,
    ) -> Result<Value, FetchError>
    where
        P: IntoIterator,
        P::Item: ToString,
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let spec = RequestSpec::new(&self.group, resource, parts, query);
        self.get_json(spec)
    }

    fn get_json(&mut self, spec: RequestSpec) -> Result<Value, FetchError> {
        let uri = spec.uri(&self.base_uri);
        let url = spec
            .url(&self.base_uri)
            .map_err(|source| FetchError::InvalidUri {
                uri: uri.clone(),
                source,
            })?;
        let request = HttpRequest::json(url.as_str(), self.session.headers.clone());
        tracing::debug!(uri = %uri, "fetching");

        let Session {
            transport, pacer, ..
        } = &mut self.session;
        let sleeper: &dyn Sleeper = &*self.sleeper;
        run_with_retry(
            &self.policy,
            &uri,
            sleeper,
            &mut *self.rng,
            &*self.observer,
            |_| {
                pacer.pace(sleeper);
                let resp = transport.get(&request).map_err(AttemptError::Transport)?;
                into_payload(resp)
            },
        )
    }

    /// Stream `url` into `sink` in [`CHUNK_SIZE`] writes; returns bytes written.
    ///
    /// HTTP 400 is retried with a fixed pause; any other failure surfaces
    /// immediately. Redirects are followed.
    pub fn download_to(&mut self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let request = HttpRequest::download(url, self.session.headers.clone());
        let mut chunked = ChunkedWriter::new(sink);
        tracing::debug!(url, "downloading");

        let Session {
            transport, pacer, ..
        } = &mut self.session;
        let sleeper: &dyn Sleeper = &*self.sleeper;
        self.download_retry
            .run(url, sleeper, &*self.observer, || {
                pacer.pace(sleeper);
                transport.stream(&request, &mut chunked)
            })?;
        chunked.finish().map_err(FetchError::Sink)
    }

    /// Download `url` fully into memory.
    pub fn download_bytes(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut buf = Vec::new();
        self.download_to(url, &mut buf)?;
        Ok(buf)
    }
}

/// Unwrap the envelope of a 200 response. Any other status is an attempt
/// failure; a 3xx lands here too because redirects are not followed.
fn into_payload(resp: HttpResponse) -> Result<Value, AttemptError> {
    if resp.status != 200 {
        return Err(AttemptError::Status {
            status: resp.status,
            yg_error: extract_yg_error(&resp.body),
        });
    }
    let mut envelope: Value =
        serde_json::from_slice(&resp.body).map_err(|e| AttemptError::Malformed {
            status: resp.status,
            reason: format!("body is not JSON: {}", e),
        })?;
    envelope
        .get_mut(DATA_FIELD)
        .map(Value::take)
        .ok_or_else(|| AttemptError::Malformed {
            status: resp.status,
            reason: format!("envelope has no {} field", DATA_FIELD),
        })
}
