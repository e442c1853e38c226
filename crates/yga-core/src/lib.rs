//! Blocking client for the Yahoo Groups JSON API.
//!
//! [`GroupClient`] resolves resource names to versioned endpoints, paces
//! requests, classifies failures into an [`ErrorKind`] and retries transient
//! ones with jittered exponential backoff. Raw attachments and file bodies
//! are fetched with [`GroupClient::download_to`].

pub mod config;
pub mod logging;

#[cfg(feature = "capture")]
pub mod capture;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod observe;
pub mod pacer;
pub mod retry;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{ClientBuilder, GroupClient, CHUNK_SIZE};
pub use endpoint::{ApiVersion, Resource, BASE_URI};
pub use error::{ConfigError, Failure, FetchError};
pub use observe::{NullObserver, Observer, TracingObserver};
pub use pacer::{Sleeper, ThreadSleeper};
pub use retry::ErrorKind;
pub use transport::{Cookie, CookieJar, CurlTransport, HttpRequest, HttpResponse, Transport, TransportError};
