//! Deployment targets ("machines") within a space.

use crate::client::RemoteClient;
use crate::error::{OctoError, Result};
use serde::Deserialize;

pub const AZURE_WEB_APP: &str = "AzureWebApp";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentTarget {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub environment_ids: Vec<String>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
}

/// One page of a collection endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourcePage<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_results: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetQuery {
    pub deployment_target_types: Vec<String>,
}

impl TargetQuery {
    pub fn of_type(target_type: &str) -> Self {
        Self {
            deployment_target_types: vec![target_type.to_string()],
        }
    }

    fn query_string(&self) -> String {
        if self.deployment_target_types.is_empty() {
            return String::new();
        }
        format!(
            "?deploymentTargetTypes={}",
            self.deployment_target_types.join(",")
        )
    }
}

/// Lists the first page of deployment targets matching `query`.
///
/// `client` must be space-scoped.
pub fn list_targets(client: &RemoteClient, query: &TargetQuery) -> Result<ResourcePage<DeploymentTarget>> {
    let space_id = client.space_id().ok_or_else(|| {
        OctoError::Internal("deployment targets need a space-scoped client".to_string())
    })?;
    let path = format!("/api/{}/machines{}", space_id, query.query_string());
    client.get_json(&path)
}
