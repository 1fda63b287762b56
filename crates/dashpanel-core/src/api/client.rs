//! reqwest-backed client for the dashboard REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use url::Url;

use super::traits::{BroadcastApi, IntegrationApi};
use super::ConfigTarget;
use crate::broadcasts::Broadcast;
use crate::error::ApiError;
use crate::integrations::Integration;

const USER_AGENT: &str = concat!("dashpanel/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// API root, e.g. `https://sentry.io/api/0/`.
    pub base_url: String,
    /// Bearer token sent with every request when present.
    pub token: Option<String>,
    pub timeout: Duration,
}

/// HTTP client for the dashboard API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    /// Build a client. A missing trailing slash on the base URL is added so
    /// relative endpoint paths join beneath it.
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut base_url = settings.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)?;
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            base,
            token: settings.token,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        tracing::debug!("api request {} {}", method, url);
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Send and turn non-2xx answers into [`ApiError::Status`].
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            url,
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path)?).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl BroadcastApi for ApiClient {
    async fn fetch_broadcasts(&self) -> Result<Vec<Broadcast>, ApiError> {
        self.get_json("broadcasts/").await
    }

    async fn mark_seen(&self, ids: &[String]) -> Result<(), ApiError> {
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();
        let builder = self
            .request(Method::PUT, "broadcasts/")?
            .query(&query)
            .json(&json!({ "hasSeen": "1" }));
        self.send(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl IntegrationApi for ApiClient {
    async fn fetch_integrations(&self, org_id: &str) -> Result<Vec<Integration>, ApiError> {
        self.get_json(&format!("organizations/{org_id}/integrations/"))
            .await
    }

    async fn save_config(
        &self,
        target: &ConfigTarget,
        config: &Map<String, Value>,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, &target.path())?
            .json(&json!({ "config": config }));
        self.send(builder).await?;
        Ok(())
    }

    async fn enable_for_project(
        &self,
        org_id: &str,
        project_id: &str,
        integration_id: &str,
    ) -> Result<(), ApiError> {
        let path = format!("projects/{org_id}/{project_id}/integrations/{integration_id}/");
        self.send(self.request(Method::PUT, &path)?).await?;
        Ok(())
    }

    async fn disable_for_project(
        &self,
        org_id: &str,
        project_id: &str,
        integration_id: &str,
    ) -> Result<(), ApiError> {
        let path = format!("projects/{org_id}/{project_id}/integrations/{integration_id}/");
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }

    async fn remove_integration(
        &self,
        org_id: &str,
        integration_id: &str,
    ) -> Result<(), ApiError> {
        let path = format!("organizations/{org_id}/integrations/{integration_id}/");
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }
}
