use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::forms::FieldDescriptor;
use crate::wire::{deserialize_id, null_as_default, null_values_as_default};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    #[default]
    Active,
    Disabled,
    #[serde(other)]
    Unknown,
}

/// The third-party service an integration was installed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the integration can be switched on per project.
    #[serde(default)]
    pub can_add_project: bool,
}

impl ProviderInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// An installed integration, as returned by the organization integrations
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain_name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub status: IntegrationStatus,
    pub provider: ProviderInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_project: Vec<FieldDescriptor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_organization: Vec<FieldDescriptor>,
    /// Organization-scoped values.
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_data: Map<String, Value>,
    /// Project id -> project-scoped values. Presence of a key means the
    /// integration is enabled for that project, even when its value is null.
    #[serde(default, deserialize_with = "null_values_as_default")]
    pub config_data_projects: HashMap<String, Map<String, Value>>,
}

impl Integration {
    pub fn is_enabled_for(&self, project_id: &str) -> bool {
        self.config_data_projects.contains_key(project_id)
    }

    pub fn has_configuration(&self) -> bool {
        !self.config_project.is_empty() || !self.config_organization.is_empty()
    }

    pub fn is_disabled(&self) -> bool {
        self.status == IntegrationStatus::Disabled
    }
}
