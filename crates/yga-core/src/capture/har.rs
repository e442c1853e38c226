//! Minimal HAR 1.2 structures and a file-backed recorder.

use super::{CapturedExchange, Recorder};
use crate::error::ConfigError;
use crate::transport::parse_status_line;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Root HAR document (top-level wrapper).
#[derive(Debug, Serialize, Deserialize)]
pub struct HarLog {
    pub log: HarRoot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HarRoot {
    pub version: String,
    pub creator: HarCreator,
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HarCreator {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    pub started_date_time: String,
    /// Total elapsed time in milliseconds.
    pub time: f64,
    pub request: HarRequest,
    pub response: HarResponse,
    #[serde(default, rename = "_error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarResponse {
    /// 0 when no response arrived.
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(default)]
    pub body_size: i64,
    #[serde(default, rename = "redirectURL")]
    pub redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarHeader {
    pub name: String,
    pub value: String,
}

impl From<&CapturedExchange> for HarEntry {
    fn from(x: &CapturedExchange) -> Self {
        let mut http_version = String::new();
        let mut headers = Vec::new();
        for line in &x.response_headers {
            if parse_status_line(line).is_some() {
                // New hop: only the final response's headers are kept.
                http_version = line.split_whitespace().next().unwrap_or_default().to_string();
                headers.clear();
            } else if let Some((name, value)) = line.split_once(':') {
                headers.push(HarHeader {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                });
            }
        }
        let redirect_url = headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case("Location"))
            .map(|h| h.value.clone())
            .unwrap_or_default();

        HarEntry {
            started_date_time: x.started.to_rfc3339(),
            time: x.elapsed.as_secs_f64() * 1000.0,
            request: HarRequest {
                method: "GET".to_string(),
                url: x.request.url.clone(),
                http_version: "HTTP/1.1".to_string(),
                headers: x
                    .request_headers
                    .iter()
                    .map(|(name, value)| HarHeader {
                        name: name.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            },
            response: HarResponse {
                status: x.status.and_then(|s| u16::try_from(s).ok()).unwrap_or(0),
                http_version,
                headers,
                body_size: i64::try_from(x.body_size).unwrap_or(i64::MAX),
                redirect_url,
            },
            error: x.error.clone(),
        }
    }
}

/// Writes captured exchanges to a HAR file.
///
/// The file is created when the recorder is built (so an unwritable path
/// fails at setup) and rewritten after every exchange, so the archive on disk
/// is complete up to the last call even if the process dies mid-session.
/// Each rewrite goes to a sibling temp file that is renamed into place.
pub struct HarRecorder {
    path: PathBuf,
    entries: Vec<HarEntry>,
}

impl HarRecorder {
    pub fn create(path: &Path) -> Result<Self, ConfigError> {
        let recorder = Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
        };
        recorder.write_out().map_err(|source| ConfigError::CaptureFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(recorder)
    }

    fn write_out(&self) -> io::Result<()> {
        let doc = HarDocRef {
            log: HarRootRef {
                version: "1.2",
                creator: HarCreator {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                entries: &self.entries,
            },
        };
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut w, &doc)?;
            w.flush()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

/// Borrowing twin of [`HarLog`] so rewriting does not clone entries.
#[derive(Serialize)]
struct HarDocRef<'a> {
    log: HarRootRef<'a>,
}

#[derive(Serialize)]
struct HarRootRef<'a> {
    version: &'static str,
    creator: HarCreator,
    entries: &'a [HarEntry],
}

impl Recorder for HarRecorder {
    fn record(&mut self, exchange: CapturedExchange) {
        self.entries.push(HarEntry::from(&exchange));
        // A failed rewrite leaves the previous archive; the next one retries.
        if let Err(e) = self.write_out() {
            tracing::warn!("failed to write HAR capture {}: {}", self.path.display(), e);
        }
    }
}
