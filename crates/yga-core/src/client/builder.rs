//! Client construction: validates every option once, at setup time.

use super::{GroupClient, Session};
use crate::endpoint::BASE_URI;
use crate::error::ConfigError;
use crate::observe::{Observer, TracingObserver};
use crate::pacer::{Pacer, Sleeper, ThreadSleeper};
use crate::retry::{DownloadRetry, RetryPolicy};
use crate::transport::{CookieJar, CurlTransport, Transport};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::path::PathBuf;

/// Builder for [`GroupClient`].
pub struct ClientBuilder {
    group: String,
    cookies: Option<CookieJar>,
    headers: Vec<(String, String)>,
    delay_secs: f64,
    base_uri: String,
    ca_bundle: Option<PathBuf>,
    capture: Option<PathBuf>,
    #[cfg(feature = "capture")]
    recorder: Option<Box<dyn crate::capture::Recorder>>,
    transport: Option<Box<dyn Transport>>,
    sleeper: Option<Box<dyn Sleeper>>,
    observer: Option<Box<dyn Observer>>,
    rng: Option<Box<dyn RngCore>>,
}

impl ClientBuilder {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            cookies: None,
            headers: Vec::new(),
            delay_secs: 0.0,
            base_uri: BASE_URI.to_string(),
            ca_bundle: None,
            capture: None,
            #[cfg(feature = "capture")]
            recorder: None,
            transport: None,
            sleeper: None,
            observer: None,
            rng: None,
        }
    }

    /// Pre-populated cookies for the built-in curl transport. Injected
    /// transports manage their own cookie state.
    pub fn cookies(mut self, jar: CookieJar) -> Self {
        self.cookies = Some(jar);
        self
    }

    /// Extra header, merged over the default `Referer`. Later values win;
    /// names compare case-insensitively.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Pacing delay in seconds before every request (default 0).
    pub fn delay(mut self, secs: f64) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Override the API base URI (mirrors, test servers).
    pub fn base_uri(mut self, base: impl Into<String>) -> Self {
        self.base_uri = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Pinned certificate chain for the built-in curl transport. Defaults to
    /// [`crate::config::default_ca_bundle`].
    pub fn ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    /// Archive every exchange to a HAR file at `path`.
    pub fn capture_har(mut self, path: impl Into<PathBuf>) -> Self {
        self.capture = Some(path.into());
        self
    }

    /// Record every exchange with a custom recorder.
    #[cfg(feature = "capture")]
    pub fn recorder(mut self, recorder: impl crate::capture::Recorder + 'static) -> Self {
        self.recorder = Some(Box::new(recorder));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Some(Box::new(sleeper));
        self
    }

    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Random source for backoff jitter.
    pub fn rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn build(self) -> Result<GroupClient, ConfigError> {
        let group = self.group.trim().to_string();
        if group.is_empty() {
            return Err(ConfigError::EmptyGroup);
        }
        let pacer = Pacer::from_secs_f64(self.delay_secs)?;
        let headers = merge_headers(&self.base_uri, self.headers)?;

        ensure_capture_available(self.capture.is_some())?;
        #[cfg(feature = "capture")]
        let capturing = self.capture.is_some() || self.recorder.is_some();
        #[cfg(not(feature = "capture"))]
        let capturing = false;

        let transport: Box<dyn Transport> = match self.transport {
            Some(t) => t,
            None => {
                let ca_bundle = match self.ca_bundle {
                    Some(p) => p,
                    None => crate::config::default_ca_bundle()?,
                };
                Box::new(
                    CurlTransport::new(&ca_bundle, self.cookies.as_ref())?
                        .trace_sent_headers(capturing),
                )
            }
        };

        #[cfg(feature = "capture")]
        let transport = wrap_capture(transport, self.capture, self.recorder)?;

        Ok(GroupClient {
            group,
            base_uri: self.base_uri,
            policy: RetryPolicy::default(),
            download_retry: DownloadRetry::default(),
            session: Session {
                transport,
                headers,
                pacer,
            },
            sleeper: self.sleeper.unwrap_or_else(|| Box::new(ThreadSleeper)),
            observer: self.observer.unwrap_or_else(|| Box::new(TracingObserver)),
            rng: self
                .rng
                .unwrap_or_else(|| Box::new(StdRng::from_entropy())),
        })
    }
}

#[cfg(feature = "capture")]
fn ensure_capture_available(_requested: bool) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(not(feature = "capture"))]
fn ensure_capture_available(requested: bool) -> Result<(), ConfigError> {
    if requested {
        return Err(ConfigError::CaptureUnavailable);
    }
    Ok(())
}

#[cfg(feature = "capture")]
fn wrap_capture(
    transport: Box<dyn Transport>,
    har: Option<PathBuf>,
    recorder: Option<Box<dyn crate::capture::Recorder>>,
) -> Result<Box<dyn Transport>, ConfigError> {
    use crate::capture::{CapturingTransport, HarRecorder, Recorder};

    /// Fans one exchange out to two recorders.
    struct Both(HarRecorder, Box<dyn Recorder>);

    impl Recorder for Both {
        fn record(&mut self, exchange: crate::capture::CapturedExchange) {
            self.1.record(exchange.clone());
            self.0.record(exchange);
        }
    }

    let har = har.map(|p| HarRecorder::create(&p)).transpose()?;
    Ok(match (har, recorder) {
        (None, None) => transport,
        (Some(h), None) => Box::new(CapturingTransport::new(transport, h)),
        (None, Some(r)) => Box::new(CapturingTransport::new(transport, r)),
        (Some(h), Some(r)) => Box::new(CapturingTransport::new(transport, Both(h, r))),
    })
}

/// Default `Referer` first, then caller headers; a caller header replaces any
/// earlier one of the same name.
fn merge_headers(
    base_uri: &str,
    extra: Vec<(String, String)>,
) -> Result<Vec<(String, String)>, ConfigError> {
    let mut merged = vec![("Referer".to_string(), base_uri.to_string())];
    for (name, value) in extra {
        let name = name.trim().to_string();
        if name.is_empty()
            || name.contains(':')
            || name.chars().any(|c| c.is_whitespace() || c.is_control())
            || value.chars().any(|c| c == '\r' || c == '\n')
        {
            return Err(ConfigError::InvalidHeader(format!("{}:{}", name, value)));
        }
        merged.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        merged.push((name, value));
    }
    Ok(merged)
}

/// Parse `NAME:VALUE` (as given on the command line or in config).
pub fn parse_header(s: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidHeader(s.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidHeader(s.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
