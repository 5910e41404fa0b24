//! # Client Factory
//!
//! Every command that talks to a server gets its client from a
//! [`ClientFactory`]. The factory owns the connection settings and two cache
//! slots:
//!
//! - the **system** client: bound to the server and credential only, used for
//!   server-wide operations such as listing spaces;
//! - the **spaced** client: additionally bound to one space, used for almost
//!   everything else.
//!
//! ## Lazy, at most once
//!
//! Nothing touches the network until a client is first asked for. Each slot is
//! a [`SingleFlight`]: the first caller builds the client, callers arriving
//! meanwhile wait for that same attempt and share its result, and later
//! callers get the cached `Arc` without any network activity. A failed attempt
//! caches nothing, so the next call starts over.
//!
//! ## Building the spaced client
//!
//! 1. Get the system client (shares the system slot).
//! 2. Decide the space:
//!    - no selector and not interactive: fail without listing spaces;
//!    - no selector, interactive: list spaces and ask the user (a lone space
//!      is picked without asking);
//!    - selector given: list spaces and [`resolve_space`].
//! 3. Connect a new client for that space ID, which fetches `/api` and
//!    `/api/<space-id>` again since each space has its own API surface.
//!
//! Errors are returned as-is to the caller and are never logged here.

use crate::client::{parse_server_url, RemoteClient};
use crate::credential::Credential;
use crate::error::{OctoError, Result};
use crate::prompt::Asker;
use crate::requester::{user_agent, Requester};
use crate::single_flight::SingleFlight;
use crate::spaces::resolve_space;
use crate::transport::Transport;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct ClientFactory {
    transport: Arc<dyn Transport>,
    server_url: String,
    credential: Arc<Credential>,
    space_selector: String,
    asker: Arc<dyn Asker>,
    system_client: SingleFlight<Arc<RemoteClient>>,
    spaced_client: SingleFlight<Arc<RemoteClient>>,
}

impl ClientFactory {
    /// Creates a factory. No request is made; only the URL is validated.
    ///
    /// An empty `space_selector` means "not specified".
    pub fn new(
        transport: Arc<dyn Transport>,
        server_url: &str,
        credential: Credential,
        space_selector: impl Into<String>,
        asker: Arc<dyn Asker>,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            server_url: parse_server_url(server_url)?,
            credential: Arc::new(credential),
            space_selector: space_selector.into().trim().to_string(),
            asker,
            system_client: SingleFlight::new(),
            spaced_client: SingleFlight::new(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn space_selector(&self) -> &str {
        &self.space_selector
    }

    /// The space the cached spaced client is bound to, if it has been built.
    pub fn current_space_id(&self) -> Option<&str> {
        self.spaced_client
            .get()
            .and_then(|client| client.space_id())
    }

    /// Returns the client bound to no space, building it on first use.
    pub fn get_system_client(&self, requester: &dyn Requester) -> Result<Arc<RemoteClient>> {
        self.system_client.get_or_try_init(|| {
            debug!(
                requester = %requester.requester(),
                server = %self.server_url,
                "building system client"
            );
            self.connect(requester, None)
        })
    }

    /// Returns the client bound to the selected space, building it on first use.
    pub fn get_spaced_client(&self, requester: &dyn Requester) -> Result<Arc<RemoteClient>> {
        self.spaced_client.get_or_try_init(|| {
            let system = self.get_system_client(requester)?;
            let space_id = self.resolve_space_id(&system)?;
            debug!(
                requester = %requester.requester(),
                space_id = %space_id,
                "building space-scoped client"
            );
            self.connect(requester, Some(&space_id))
        })
    }

    fn resolve_space_id(&self, system: &RemoteClient) -> Result<String> {
        if self.space_selector.is_empty() {
            if !self.asker.is_interactive() {
                return Err(OctoError::SpaceUnspecified);
            }
            let spaces = system.spaces().all()?;
            debug!(count = spaces.len(), "listed spaces for selection");
            return match spaces.as_slice() {
                [] => Err(OctoError::SpaceNotFound(String::new())),
                [only] => Ok(only.id.clone()),
                _ => self.asker.select_space(&spaces).map(|space| space.id),
            };
        }

        let spaces = system.spaces().all()?;
        debug!(
            count = spaces.len(),
            selector = %self.space_selector,
            "resolving space selector"
        );
        resolve_space(&self.space_selector, &spaces).map(|space| space.id.clone())
    }

    fn connect(
        &self,
        requester: &dyn Requester,
        space_id: Option<&str>,
    ) -> Result<Arc<RemoteClient>> {
        RemoteClient::connect(
            Arc::clone(&self.transport),
            &self.server_url,
            Arc::clone(&self.credential),
            space_id,
            user_agent(requester),
        )
        .map(Arc::new)
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("server_url", &self.server_url)
            .field("space_selector", &self.space_selector)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
