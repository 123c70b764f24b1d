//! Scripted collaborators for exercising the orchestrator without a server.

use crate::notify::{Notifier, SoundCue};
use crate::transport::{Payload, Request, RequestOutcome, Transport};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Transport that answers from per-route queues and records every request.
///
/// A route with an empty queue answers with a status-less failure, as if
/// the server were unreachable.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `outcome` as the next answer for `method path`.
    pub fn respond(&self, method: Method, path: impl Into<String>, outcome: RequestOutcome) {
        self.script(method, path.into(), outcome, None);
    }

    /// Queue `outcome`, but hold it back until the returned sender fires or
    /// is dropped.
    pub fn respond_later(
        &self,
        method: Method,
        path: impl Into<String>,
        outcome: RequestOutcome,
    ) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.script(method, path.into(), outcome, Some(gate));
        release
    }

    fn script(
        &self,
        method: Method,
        path: String,
        outcome: RequestOutcome,
        gate: Option<oneshot::Receiver<()>>,
    ) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path))
            .or_default()
            .push_back(Scripted { outcome, gate });
    }

    pub fn respond_json<T: Serialize>(
        &self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        body: &T,
    ) {
        self.respond(method, path, RequestOutcome::success(status, Payload::json(body)));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests to `method path`.
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| &request.method == method && request.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> RequestOutcome {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&(request.method.clone(), request.path.clone()))
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted { outcome, gate }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                outcome
            }
            None => RequestOutcome::unreachable(format!("no scripted answer for {request}")),
        }
    }
}

struct Scripted {
    outcome: RequestOutcome,
    gate: Option<oneshot::Receiver<()>>,
}

/// Notifier that remembers every alert and cue.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
    sounds: Mutex<Vec<SoundCue>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn sounds(&self) -> Vec<SoundCue> {
        self.sounds.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn play_sound(&self, cue: SoundCue) {
        self.sounds.lock().unwrap().push(cue);
    }
}
