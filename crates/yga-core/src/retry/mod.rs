//! Retry and error classification.
//!
//! Classification maps each failed attempt onto one taxonomy kind; the policy
//! turns that kind plus the attempt index into a decision; the run loop drives
//! attempts, sleeps between them, and surfaces the terminal error. Byte
//! downloads follow their own fixed-pause rule in [`download`].

mod classify;
pub mod download;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status, classify_transport_error, extract_yg_error};
pub use download::DownloadRetry;
pub use error::AttemptError;
pub use policy::{backoff_delay, ErrorKind, RetryDecision, RetryPolicy, MAX_ATTEMPTS};
pub use run::{run_with_retry, AttemptState};
