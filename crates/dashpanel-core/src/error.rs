//! Core error types for dashpanel-core.
//!
//! One top-level [`CoreError`] wraps the per-area errors so callers can use
//! `?` across API, configuration and form handling.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dashpanel-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// REST API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Form/field validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Credential store errors
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while talking to the dashboard REST API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Validation errors for descriptor-driven forms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was left empty
    #[error("'{field}' is required")]
    Required { field: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Field is not part of the form
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Field is read-only
    #[error("Field '{0}' is read-only")]
    ReadOnly(String),
}

impl From<keyring::Error> for CoreError {
    fn from(err: keyring::Error) -> Self {
        CoreError::Keyring(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
