//! Test doubles: scripted transport, recording sleeper and observer.

use crate::observe::Observer;
use crate::pacer::Sleeper;
use crate::retry::{AttemptError, ErrorKind};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every sleep instead of blocking. Clones share the record.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// One scripted reply.
pub(crate) enum Reply {
    Response(HttpResponse),
    Error(TransportError),
}

impl Reply {
    pub(crate) fn json(status: u32, body: serde_json::Value) -> Self {
        Reply::Response(HttpResponse::new(status, body.to_string()))
    }

    pub(crate) fn status(status: u32) -> Self {
        Reply::Response(HttpResponse::new(status, Vec::new()))
    }

    pub(crate) fn body(status: u32, body: &[u8]) -> Self {
        Reply::Response(HttpResponse::new(status, body.to_vec()))
    }
}

/// Replays replies in order; the last one repeats once the script runs out.
/// Clones share the script and the request log.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    repeat_last: Arc<Mutex<Option<(u32, Vec<u8>)>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let t = Self::default();
        t.replies.lock().unwrap().extend(replies);
        t
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&mut self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(req.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Response(r)) => {
                *self.repeat_last.lock().unwrap() = Some((r.status, r.body.clone()));
                Ok(r)
            }
            Some(Reply::Error(e)) => Err(e),
            None => match self.repeat_last.lock().unwrap().clone() {
                Some((status, body)) => Ok(HttpResponse::new(status, body)),
                None => Err(TransportError::Connection("script exhausted".into())),
            },
        }
    }
}

impl Transport for ScriptedTransport {
    fn get(&mut self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.next(req)
    }

    fn stream(&mut self, req: &HttpRequest, sink: &mut dyn Write) -> Result<u32, TransportError> {
        let resp = self.next(req)?;
        if resp.is_success() {
            sink.write_all(&resp.body).map_err(TransportError::Sink)?;
        }
        Ok(resp.status)
    }
}

/// Observer event, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Failed { attempt: u32, kind: ErrorKind },
    Retrying { next_attempt: u32, delay: Duration },
    DownloadRetry { remaining: u32 },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingObserver {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn attempt_failed(&self, _uri: &str, attempt: u32, _max: u32, kind: ErrorKind, _e: &AttemptError) {
        self.events.lock().unwrap().push(Event::Failed { attempt, kind });
    }

    fn retrying(&self, _uri: &str, next_attempt: u32, delay: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Retrying { next_attempt, delay });
    }

    fn download_retry(&self, _url: &str, remaining: u32, _pause: Duration) {
        self.events.lock().unwrap().push(Event::DownloadRetry { remaining });
    }
}
