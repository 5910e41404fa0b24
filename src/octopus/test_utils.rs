//! Test doubles for code that needs a server, a requester or a user.
//!
//! [`MockTransport`] replays a queue of scripted responses. Every request is
//! matched against the head of the queue; a request that does not match (or
//! arrives when the queue is empty) is answered with a `Connectivity` error
//! naming what was expected, so tests fail loudly instead of hanging.

use crate::error::{OctoError, Result};
use crate::prompt::Asker;
use crate::requester::Requester;
use crate::spaces::Space;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const SERVER_URL: &str = "http://server";
pub const PLACEHOLDER_API_KEY: &str = "API-XXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

struct Expectation {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    response: Result<HttpResponse>,
}

pub struct MockTransport {
    server: String,
    latency: Option<Duration>,
    expectations: Mutex<VecDeque<Expectation>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_server(SERVER_URL)
    }

    /// A mock whose requests are expected under `server` instead of `http://server`.
    pub fn with_server(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            latency: None,
            expectations: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Delays every response, widening the window for concurrent callers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn expect(&self, method: &str, path: &str) -> ExpectationBuilder<'_> {
        ExpectationBuilder {
            transport: self,
            method: method.to_string(),
            path: path.to_string(),
            headers: Vec::new(),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Paths (with query) of every request received, in order.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| self.path_of(&request.url))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn assert_drained(&self) {
        let remaining: Vec<String> = self
            .expectations
            .lock()
            .unwrap()
            .iter()
            .map(|e| format!("{} {}", e.method, e.path))
            .collect();
        assert!(
            remaining.is_empty(),
            "expected requests never arrived: {:?}",
            remaining
        );
    }

    fn path_of(&self, url: &str) -> String {
        url.strip_prefix(&self.server).unwrap_or(url).to_string()
    }

    fn push(&self, expectation: Expectation) {
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let path = self.path_of(&request.url);
        let expectation = self
            .expectations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| {
                OctoError::Connectivity(format!(
                    "unexpected request {} {}",
                    request.method, path
                ))
            })?;

        if expectation.method != request.method || expectation.path != path {
            return Err(OctoError::Connectivity(format!(
                "expected {} {} but got {} {}",
                expectation.method, expectation.path, request.method, path
            )));
        }
        for (name, value) in &expectation.headers {
            if request.header(name) != Some(value.as_str()) {
                return Err(OctoError::Connectivity(format!(
                    "expected header {}: {} on {} but got {:?}",
                    name,
                    value,
                    path,
                    request.header(name)
                )));
            }
        }
        expectation.response
    }
}

pub struct ExpectationBuilder<'a> {
    transport: &'a MockTransport,
    method: String,
    path: String,
    headers: Vec<(String, String)>,
}

impl ExpectationBuilder<'_> {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn respond_json<T: Serialize + ?Sized>(self, body: &T) {
        let body = serde_json::to_vec(body).expect("fixture must serialize");
        self.finish(Ok(HttpResponse::new(200, body)));
    }

    pub fn respond_status(self, status: u16, body: &str) {
        self.finish(Ok(HttpResponse::new(status, body)));
    }

    pub fn fail(self, error: OctoError) {
        self.finish(Err(error));
    }

    fn finish(self, response: Result<HttpResponse>) {
        self.transport.push(Expectation {
            method: self.method,
            path: self.path,
            headers: self.headers,
            response,
        });
    }
}

/// A requester with an empty label.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeRequester;

impl Requester for FakeRequester {
    fn requester(&self) -> String {
        String::new()
    }
}

/// An interactive asker that answers from a script and records what it was shown.
pub struct ScriptedAsker {
    choice: Option<String>,
    checks: AtomicUsize,
    offered: Mutex<Vec<Vec<Space>>>,
}

impl ScriptedAsker {
    /// Picks the space with this ID when asked.
    pub fn choosing(space_id: &str) -> Self {
        Self {
            choice: Some(space_id.to_string()),
            checks: AtomicUsize::new(0),
            offered: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a user pressing Escape.
    pub fn cancelling() -> Self {
        Self {
            choice: None,
            checks: AtomicUsize::new(0),
            offered: Mutex::new(Vec::new()),
        }
    }

    pub fn offered(&self) -> Vec<Vec<Space>> {
        self.offered.lock().unwrap().clone()
    }

    pub fn interactivity_checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl Asker for ScriptedAsker {
    fn is_interactive(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn select_space(&self, spaces: &[Space]) -> Result<Space> {
        self.offered.lock().unwrap().push(spaces.to_vec());
        let choice = self.choice.as_deref().ok_or(OctoError::PromptCancelled)?;
        spaces
            .iter()
            .find(|space| space.id == choice)
            .cloned()
            .ok_or_else(|| OctoError::SpaceNotFound(choice.to_string()))
    }
}

pub mod fixtures {
    use serde_json::{json, Value};

    pub fn root() -> Value {
        json!({
            "Application": "Octopus Deploy",
            "Version": "2023.1.0",
            "ApiVersion": "3.0.0",
            "Links": {
                "Self": "/api",
                "Spaces": "/api/spaces{/id}{?skip,ids,take,partialName}"
            }
        })
    }

    pub fn space_json(id: &str, name: &str) -> Value {
        json!({
            "Id": id,
            "Name": name,
            "IsDefault": false,
            "Links": {
                "Self": format!("/api/spaces/{}", id)
            }
        })
    }
}
