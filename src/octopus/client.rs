//! The authenticated handle used for every server call.
//!
//! A [`RemoteClient`] is bound to one server, one credential and, optionally,
//! one space. Building it is not free: [`RemoteClient::connect`] fetches the
//! server's root document (and for a space-scoped client, the space's own
//! root) to prove the URL and credential work before handing the client out.
//! After that the client is immutable and can be shared across threads.

use crate::credential::Credential;
use crate::error::{OctoError, Result};
use crate::spaces::SpaceDirectory;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const ROOT_PATH: &str = "/api";
const MAX_ERROR_BODY: usize = 200;

/// The server's top-level document. Fetched to validate connectivity and to
/// learn what the server is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RootResource {
    pub application: String,
    pub version: String,
    pub api_version: String,
    pub links: BTreeMap<String, String>,
}

/// The root document of a single space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpaceRootResource {
    pub links: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    error_message: String,
    #[serde(default)]
    errors: Vec<String>,
}

/// Validates and normalizes a server URL: http(s) only, host required,
/// trailing slashes dropped so paths can be appended directly.
pub fn parse_server_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = reqwest::Url::parse(trimmed)
        .map_err(|_| OctoError::InvalidServerUrl(trimmed.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(OctoError::InvalidServerUrl(trimmed.to_string()));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

pub struct RemoteClient {
    transport: Arc<dyn Transport>,
    server_url: String,
    credential: Arc<Credential>,
    user_agent: String,
    space_id: Option<String>,
    root: RootResource,
    space_root: Option<SpaceRootResource>,
}

impl RemoteClient {
    /// Builds a client and validates it against the server.
    ///
    /// Always fetches `/api`. With a `space_id`, also fetches `/api/<space_id>`,
    /// because each space exposes its own API surface.
    pub fn connect(
        transport: Arc<dyn Transport>,
        server_url: &str,
        credential: Arc<Credential>,
        space_id: Option<&str>,
        user_agent: impl Into<String>,
    ) -> Result<Self> {
        let server_url = parse_server_url(server_url)?;
        let mut client = Self {
            transport,
            server_url,
            credential,
            user_agent: user_agent.into(),
            space_id: space_id.map(str::to_string),
            root: RootResource::default(),
            space_root: None,
        };

        debug!(server = %client.server_url, "fetching root resource");
        client.root = client.get_json(ROOT_PATH)?;

        if let Some(space_id) = space_id {
            debug!(server = %client.server_url, space_id, "fetching space root resource");
            let path = format!("{}/{}", ROOT_PATH, space_id);
            client.space_root = Some(client.get_json(&path)?);
        }

        Ok(client)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    pub fn root(&self) -> &RootResource {
        &self.root
    }

    pub fn space_root(&self) -> Option<&SpaceRootResource> {
        self.space_root.as_ref()
    }

    pub fn spaces(&self) -> SpaceDirectory<'_> {
        SpaceDirectory::new(self)
    }

    /// Issues an authenticated GET for `path` (relative to the server URL,
    /// starting with `/`) and decodes the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path)?;
        serde_json::from_slice(&response.body).map_err(|e| {
            OctoError::Serialization(format!("cannot decode response from {}: {}", path, e))
        })
    }

    fn get(&self, path: &str) -> Result<HttpResponse> {
        let request = HttpRequest::get(format!("{}{}", self.server_url, path))
            .with_header(self.credential.header_name(), self.credential.header_value())
            .with_header("User-Agent", self.user_agent.as_str())
            .with_header("Accept", "application/json");

        let response = self.transport.send(&request)?;
        check_status(response)
    }
}

fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let message = error_message(&response);
    match response.status {
        401 | 403 => Err(OctoError::Authentication(message)),
        status => Err(OctoError::Api { status, message }),
    }
}

fn error_message(response: &HttpResponse) -> String {
    if let Ok(body) = serde_json::from_slice::<ApiErrorBody>(&response.body) {
        if body.errors.is_empty() {
            return body.error_message;
        }
        return format!("{} ({})", body.error_message, body.errors.join("; "));
    }
    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        return format!("HTTP {}", response.status);
    }
    text.chars().take(MAX_ERROR_BODY).collect()
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("server_url", &self.server_url)
            .field("space_id", &self.space_id)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
