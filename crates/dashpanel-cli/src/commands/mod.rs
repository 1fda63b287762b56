pub mod auth;
pub mod broadcasts;
pub mod config;
pub mod integrations;

use dashpanel_core::storage::credentials;
use dashpanel_core::{ApiClient, Config};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Build an API client from the config file and the stored token.
pub fn api_client(config: &Config) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let token = credentials::api_token();
    if token.is_none() {
        tracing::debug!("no API token configured, sending anonymous requests");
    }
    Ok(ApiClient::new(config.api_settings(token))?)
}

/// Flag value, else the configured default, else an error naming both.
pub fn resolve(
    flag: Option<String>,
    configured: &Option<String>,
    what: &str,
    key: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    flag.or_else(|| configured.clone())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("no {what} given; pass --{what} or run `dashpanel config set {key} <value>`").into())
}
