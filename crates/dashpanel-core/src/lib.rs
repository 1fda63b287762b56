//! # Dashpanel Core Library
//!
//! Core logic behind the `dashpanel` CLI: two dashboard panels backed by a
//! Sentry-style REST API.
//!
//! ## Architecture
//!
//! - **Broadcasts**: a poller that keeps the list of recent updates fresh and
//!   marks unseen items as seen once the panel has been open for a short dwell
//! - **Integrations**: the row model for one installed integration, with
//!   per-project enablement and project/organization scoped configuration
//! - **Forms**: field descriptors sent as data, rendered and validated by a
//!   generic save-on-blur form
//! - **Storage**: TOML configuration and keyring-backed API credentials
//!
//! ## Key Components
//!
//! - [`BroadcastPoller`]: background fetch loop and dwell timer
//! - [`IntegrationRow`]: view model for one installed integration
//! - [`ConfigForm`]: descriptor-driven form with undo
//! - [`ApiClient`]: reqwest client implementing the API traits
//! - [`Config`]: application configuration management

pub mod api;
pub mod broadcasts;
pub mod error;
pub mod forms;
pub mod integrations;
pub mod logging;
pub mod storage;
mod wire;

pub use api::{ApiClient, ApiSettings, BroadcastApi, ConfigTarget, IntegrationApi};
pub use broadcasts::{Broadcast, BroadcastPoller, BroadcastState, PanelState, PollerSettings};
pub use error::{ApiError, ConfigError, CoreError, ValidationError};
pub use forms::{ConfigForm, FieldDescriptor, FieldKind};
pub use integrations::{Integration, IntegrationRow, IntegrationRowHandler};
pub use storage::Config;
