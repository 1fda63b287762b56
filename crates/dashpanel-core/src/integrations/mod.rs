//! Installed third-party integrations and the per-project row that manages
//! their enablement, configuration and removal.

mod row;
mod traits;
mod types;

pub use row::{
    ConfigScope, ConfigurationSummary, ConfigurationView, ConfigureButton, IconView,
    IntegrationRow, IntegrationRowView, OrganizationSection, RemovalAction, SwitchView,
    ORGANIZATION_SCOPE_ALERT,
};
pub use traits::{IntegrationRowHandler, IntentRecorder, RowIntent};
pub use types::{Integration, IntegrationStatus, ProviderInfo};
