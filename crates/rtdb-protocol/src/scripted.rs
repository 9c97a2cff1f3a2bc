//! In-memory transport that replays scripted responses.
//!
//! [`ScriptedTransport`] hands out queued responses in order and records
//! every request it receives. When the queue is empty it falls back to a
//! repeated response if one was set, otherwise it fails the call. It is meant
//! for unit tests and for exercising callers without a backend.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{HttpRequest, HttpResponse, Method};
use crate::transport::Transport;

enum Scripted {
    Response(HttpResponse),
    Failure(String),
}

#[derive(Default)]
struct State {
    queue: VecDeque<Scripted>,
    repeat: Option<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// A [`Transport`] driven by a script instead of the network.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a response.
    pub fn push_response(&self, response: HttpResponse) {
        self.lock().queue.push_back(Scripted::Response(response));
    }

    /// Queue a network-level failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().queue.push_back(Scripted::Failure(message.into()));
    }

    /// Answer with `response` whenever the queue is empty.
    pub fn repeat(&self, response: HttpResponse) {
        self.lock().repeat = Some(response);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of requests received with `method`.
    pub fn count(&self, method: Method) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // a panicking test thread must not hide the recorded requests
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> ProtocolResult<HttpResponse> {
        let next = {
            let mut state = self.lock();
            state.requests.push(request);
            match state.queue.pop_front() {
                Some(scripted) => Some(scripted),
                None => state.repeat.clone().map(Scripted::Response),
            }
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(ProtocolError::Transport(message)),
            None => Err(ProtocolError::Transport("no scripted response left".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest::new(Method::Get, url)
    }

    #[tokio::test]
    async fn replays_in_order() {
        let t = ScriptedTransport::new();
        t.push_response(HttpResponse::new(200));
        t.push_response(HttpResponse::new(204));
        assert_eq!(t.pending(), 2);
        assert_eq!(t.execute(get("a")).await.unwrap().status, 200);
        assert_eq!(t.execute(get("b")).await.unwrap().status, 204);
        assert_eq!(t.pending(), 0);
        assert_eq!(t.request_count(), 2);
        assert_eq!(t.requests()[1].url, "b");
    }

    #[tokio::test]
    async fn empty_script_fails() {
        let t = ScriptedTransport::new();
        let err = t.execute(get("a")).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Transport(_)));
        assert_eq!(t.request_count(), 1);
    }

    #[tokio::test]
    async fn repeat_after_queue() {
        let t = ScriptedTransport::new();
        t.push_failure("reset");
        t.repeat(HttpResponse::new(412));
        assert!(t.execute(get("a")).await.is_err());
        for _ in 0..3 {
            assert_eq!(t.execute(get("a")).await.unwrap().status, 412);
        }
        assert_eq!(t.count(Method::Get), 4);
        assert_eq!(t.count(Method::Put), 0);
    }
}
