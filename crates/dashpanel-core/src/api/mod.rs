//! REST API access for the dashboard panels.
//!
//! [`ApiClient`] talks HTTP through reqwest; panels only see the
//! [`BroadcastApi`] and [`IntegrationApi`] traits.

mod client;
pub mod traits;

pub use client::{ApiClient, ApiSettings};
pub use traits::{BroadcastApi, IntegrationApi};

use serde::{Deserialize, Serialize};

/// Where a configuration form posts its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum ConfigTarget {
    /// Settings that apply to one project only.
    Project {
        org_id: String,
        project_id: String,
        integration_id: String,
    },
    /// Settings shared by every project in the organization.
    Organization {
        org_id: String,
        integration_id: String,
    },
}

impl ConfigTarget {
    /// Endpoint path relative to the API base.
    pub fn path(&self) -> String {
        match self {
            ConfigTarget::Project {
                org_id,
                project_id,
                integration_id,
            } => format!("projects/{org_id}/{project_id}/integrations/{integration_id}/"),
            ConfigTarget::Organization {
                org_id,
                integration_id,
            } => format!("organizations/{org_id}/integrations/{integration_id}/"),
        }
    }

    pub fn integration_id(&self) -> &str {
        match self {
            ConfigTarget::Project { integration_id, .. }
            | ConfigTarget::Organization { integration_id, .. } => integration_id,
        }
    }

    pub fn is_organization(&self) -> bool {
        matches!(self, ConfigTarget::Organization { .. })
    }
}
