//! Retry loop: run an attempt closure until success or the policy says stop.

use super::classify;
use super::error::AttemptError;
use super::policy::{ErrorKind, RetryDecision, RetryPolicy};
use crate::error::{FetchError, Failure};
use crate::observe::Observer;
use crate::pacer::Sleeper;
use rand::RngCore;

/// Per-call attempt bookkeeping. Dropped when the call resolves.
#[derive(Debug)]
pub struct AttemptState {
    /// 0-based index of the attempt in flight.
    pub attempt: u32,
    pub max_attempts: u32,
    pub last_error: Option<AttemptError>,
}

impl AttemptState {
    fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            last_error: None,
        }
    }

    fn into_error(mut self, uri: &str, kind: ErrorKind) -> FetchError {
        let mut failure = Failure {
            uri: uri.to_string(),
            status: None,
            attempts: self.attempt + 1,
            yg_error: None,
        };
        match self.last_error.take() {
            Some(AttemptError::Transport(e)) => FetchError::from_kind(kind, failure, Some(e)),
            Some(AttemptError::Status { status, yg_error }) => {
                failure.status = Some(status);
                failure.yg_error = yg_error;
                FetchError::from_kind(kind, failure, None)
            }
            Some(AttemptError::Malformed { status, reason }) => {
                failure.status = Some(status);
                FetchError::MalformedResponse { failure, reason }
            }
            None => FetchError::from_kind(kind, failure, None),
        }
    }
}

/// Runs `attempt` until it succeeds or the retry policy says to stop.
///
/// On a retryable failure, sleeps for the backoff duration on the calling
/// thread and tries again. Unrecoverable kinds surface after one attempt.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    uri: &str,
    sleeper: &dyn Sleeper,
    rng: &mut dyn RngCore,
    observer: &dyn Observer,
    mut attempt: F,
) -> Result<T, FetchError>
where
    F: FnMut(&AttemptState) -> Result<T, AttemptError>,
{
    let mut state = AttemptState::new(policy.max_attempts);
    loop {
        let err = match attempt(&state) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        let kind = classify::classify(&err);
        observer.attempt_failed(uri, state.attempt, state.max_attempts, kind, &err);
        let decision = policy.decide(state.attempt, kind, rng);
        state.last_error = Some(err);
        match decision {
            RetryDecision::RetryAfter(delay) => {
                observer.retrying(uri, state.attempt + 1, delay);
                sleeper.sleep(delay);
                state.attempt += 1;
            }
            RetryDecision::FailFast | RetryDecision::Exhausted => {
                return Err(state.into_error(uri, kind));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::NullObserver;
    use crate::testing::RecordingSleeper;
    use crate::transport::TransportError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const URI: &str = "https://groups.yahoo.com/api/v1/groups/g/messages";

    fn run<T>(
        sleeper: &RecordingSleeper,
        f: impl FnMut(&AttemptState) -> Result<T, AttemptError>,
    ) -> Result<T, FetchError> {
        let mut rng = StdRng::seed_from_u64(3);
        run_with_retry(&RetryPolicy::default(), URI, sleeper, &mut rng, &NullObserver, f)
    }

    #[test]
    fn succeeds_after_transient_errors() {
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;
        let out = run(&sleeper, |state| {
            calls += 1;
            if state.attempt < 2 {
                Err(AttemptError::Transport(TransportError::Timeout("slow".into())))
            } else {
                Ok(state.attempt)
            }
        })
        .unwrap();
        assert_eq!(out, 2);
        assert_eq!(calls, 3);
        assert_eq!(sleeper.sleeps().len(), 2);
    }

    #[test]
    fn exhaustion_reports_last_status_and_attempts() {
        let sleeper = RecordingSleeper::default();
        let err = run(&sleeper, |_| -> Result<(), _> {
            Err(AttemptError::Status { status: 503, yg_error: None })
        })
        .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.attempts(), 5);
        assert_eq!(err.status(), Some(503));

        let sleeps = sleeper.sleeps();
        assert_eq!(sleeps.len(), 4);
        for (i, d) in sleeps.iter().enumerate() {
            let low = Duration::from_secs(1 << i);
            assert!(*d >= low && *d < low * 2, "sleep {i}: {d:?}");
        }
    }

    #[test]
    fn not_found_fails_fast() {
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;
        let err = run(&sleeper, |_| -> Result<(), _> {
            calls += 1;
            Err(AttemptError::Status { status: 404, yg_error: None })
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
        assert_eq!(calls, 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[test]
    fn malformed_envelope_not_retried() {
        let sleeper = RecordingSleeper::default();
        let err = run(&sleeper, |_| -> Result<(), _> {
            Err(AttemptError::Malformed { status: 200, reason: "missing ygData".into() })
        })
        .unwrap_err();
        match err {
            FetchError::MalformedResponse { failure, reason } => {
                assert_eq!(failure.attempts, 1);
                assert_eq!(failure.status, Some(200));
                assert!(reason.contains("ygData"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn transport_error_kept_as_source() {
        let sleeper = RecordingSleeper::default();
        let err = run(&sleeper, |_| -> Result<(), _> {
            Err(AttemptError::Transport(TransportError::Connection("refused".into())))
        })
        .unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.status(), None);
    }
}
