use async_trait::async_trait;
use serde_json::{Map, Value};

use super::ConfigTarget;
use crate::broadcasts::Broadcast;
use crate::error::ApiError;
use crate::integrations::Integration;

/// Remote operations backing the broadcast panel.
///
/// Implemented by [`super::ApiClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait BroadcastApi: Send + Sync {
    /// `GET broadcasts/`
    async fn fetch_broadcasts(&self) -> Result<Vec<Broadcast>, ApiError>;

    /// `PUT broadcasts/?id=..&id=..` with `{"hasSeen": "1"}`.
    async fn mark_seen(&self, ids: &[String]) -> Result<(), ApiError>;
}

/// Remote operations backing an installed-integration row and its parent list.
#[async_trait]
pub trait IntegrationApi: Send + Sync {
    /// `GET organizations/{org}/integrations/`
    async fn fetch_integrations(&self, org_id: &str) -> Result<Vec<Integration>, ApiError>;

    /// `POST` the `{"config": ..}` payload to the target's endpoint.
    async fn save_config(
        &self,
        target: &ConfigTarget,
        config: &Map<String, Value>,
    ) -> Result<(), ApiError>;

    /// `PUT projects/{org}/{project}/integrations/{id}/`
    async fn enable_for_project(
        &self,
        org_id: &str,
        project_id: &str,
        integration_id: &str,
    ) -> Result<(), ApiError>;

    /// `DELETE projects/{org}/{project}/integrations/{id}/`
    async fn disable_for_project(
        &self,
        org_id: &str,
        project_id: &str,
        integration_id: &str,
    ) -> Result<(), ApiError>;

    /// `DELETE organizations/{org}/integrations/{id}/`
    async fn remove_integration(&self, org_id: &str, integration_id: &str)
        -> Result<(), ApiError>;
}
