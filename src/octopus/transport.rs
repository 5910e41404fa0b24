//! # Transport Layer
//!
//! Every byte the CLI exchanges with a server goes through the [`Transport`]
//! trait. Clients never talk to the network directly.
//!
//! ## Implementations
//!
//! - [`HttpTransport`]: production transport over a blocking `reqwest` client.
//! - `test_utils::MockTransport`: scripted expectations for tests, no sockets.
//!
//! A transport sends one request and returns one response. It does not
//! interpret status codes and never retries; the client on top does the
//! interpreting.

use crate::error::{OctoError, Result};
use std::time::Duration;
use tracing::trace;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a single request and returns the raw response.
///
/// Implementations must be safe to share between threads: one transport
/// backs every client a factory builds.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OctoError::Connectivity(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| OctoError::Internal(format!("bad HTTP method: {}", e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        trace!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        trace!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = HttpRequest::get("http://server/api").with_header("Authorization", "Bearer x");
        assert_eq!(request.header("authorization"), Some("Bearer x"));
        assert_eq!(request.header("X-Missing"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }

    #[test]
    fn test_unreachable_server_is_connectivity_error() {
        let transport = HttpTransport::new().unwrap();
        // Port 9 on loopback (discard) is closed on any sane test machine.
        let err = transport
            .send(&HttpRequest::get("http://127.0.0.1:9/api"))
            .unwrap_err();
        assert!(matches!(err, OctoError::Connectivity(_)));
    }
}
