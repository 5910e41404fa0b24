//! Spaces: the server's top-level partitions.
//!
//! Most API operations are scoped to a space, so before a space-scoped client
//! can be built the user's selector has to be turned into a space ID. The
//! selector may be an ID (`Spaces-7`) or a name (`Integrations`), in any case.
//!
//! ## Resolution rules
//!
//! [`resolve_space`] compares the selector case-insensitively against every
//! space's ID and every space's name:
//!
//! 1. If any space's **name** matches, the first such space wins.
//! 2. Otherwise, if any space's **ID** matches, the first such space wins.
//! 3. Otherwise resolution fails with `cannot find partition '<selector>'`.
//!
//! Note the sharp edge in rule 1: a space literally named `Spaces-7` shadows
//! the space whose ID is `Spaces-7`. That precedence is relied on by existing
//! scripts and is kept on purpose.

use crate::client::RemoteClient;
use crate::error::{OctoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const ALL_SPACES_PATH: &str = "/api/spaces/all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl Space {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            is_default: false,
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Lists the spaces visible to a client's credential.
pub struct SpaceDirectory<'a> {
    client: &'a RemoteClient,
}

impl<'a> SpaceDirectory<'a> {
    pub fn new(client: &'a RemoteClient) -> Self {
        Self { client }
    }

    /// Every space on the server, unpaged.
    pub fn all(&self) -> Result<Vec<Space>> {
        self.client.get_json(ALL_SPACES_PATH)
    }
}

/// Picks the space `selector` refers to. See the module docs for the rules.
pub fn resolve_space<'s>(selector: &str, spaces: &'s [Space]) -> Result<&'s Space> {
    let wanted = selector.to_lowercase();
    let by_name = spaces
        .iter()
        .find(|space| space.name.to_lowercase() == wanted);
    let by_id = spaces
        .iter()
        .find(|space| space.id.to_lowercase() == wanted);

    by_name
        .or(by_id)
        .ok_or_else(|| OctoError::SpaceNotFound(selector.to_string()))
}
