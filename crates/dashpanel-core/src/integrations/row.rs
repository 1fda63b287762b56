//! View model for one installed integration.
//!
//! Holds the `configuring` toggle and the two scoped configuration forms.
//! Everything else is derived from the integration record on demand.

use std::str::FromStr;

use serde::Serialize;

use super::traits::IntegrationRowHandler;
use super::types::{Integration, IntegrationStatus};
use crate::api::ConfigTarget;
use crate::forms::{ConfigForm, FieldView};

pub const ICON_SIZE: u32 = 32;
pub const ENABLE_TOOLTIP: &str = "Enable for this Project";
pub const ORGANIZATION_SCOPE_ALERT: &str = "The following configurations are organization-scoped. \
     Changing these will change the settings globally.";
pub const REMOVE_MESSAGE: &str = "Removing this integration will disable the integration for all \
     projects and any repositories from this integration. \
     Are you sure you want to remove this integration?";
pub const UPSTREAM_CONFIRM_TEXT: &str = "Go to GitHub";

/// Providers whose installations can only be removed from the provider side.
const UPSTREAM_MANAGED_PROVIDERS: &[&str] = &["github"];

/// Which of the two configuration forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigScope {
    Project,
    Organization,
}

impl FromStr for ConfigScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(ConfigScope::Project),
            "organization" | "org" => Ok(ConfigScope::Organization),
            _ => Err(format!("Unknown config scope: {s} (expected project or organization)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IconView {
    Image { url: String, size: u32 },
    /// No icon URL; fall back to the provider's plugin icon.
    Plugin { provider_key: String, size: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchView {
    pub active: bool,
    pub tooltip: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigureButton {
    pub disabled: bool,
    pub primary: bool,
}

/// The trash action at the end of the row. Both variants need confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemovalAction {
    /// Uninstall must happen at the provider; confirming hands off there.
    Disable {
        confirm_text: &'static str,
        message: String,
    },
    Remove {
        disabled: bool,
        message: &'static str,
    },
}

impl RemovalAction {
    pub fn message(&self) -> &str {
        match self {
            RemovalAction::Disable { message, .. } => message,
            RemovalAction::Remove { message, .. } => message,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, RemovalAction::Remove { disabled: true, .. })
    }
}

/// Organization form with its global-change warning.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationSection<'a> {
    pub alert: &'static str,
    pub form: &'a ConfigForm,
}

/// The inline configuration area; only produced while visible.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationView<'a> {
    pub project: Option<&'a ConfigForm>,
    pub organization: Option<OrganizationSection<'a>>,
}

/// Serializable snapshot of everything the row renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationRowView {
    pub id: String,
    pub name: String,
    pub domain_name: String,
    pub icon: IconView,
    pub dimmed: bool,
    pub enable_switch: Option<SwitchView>,
    pub configure_button: Option<ConfigureButton>,
    pub removal: RemovalAction,
    pub configuration: Option<ConfigurationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationSummary {
    pub project_fields: Option<Vec<FieldView>>,
    pub organization_alert: Option<&'static str>,
    pub organization_fields: Option<Vec<FieldView>>,
}

/// Row state for one installed integration within a project's settings.
#[derive(Debug, Clone)]
pub struct IntegrationRow {
    org_id: String,
    project_id: String,
    integration: Integration,
    configuring: bool,
    project_form: Option<ConfigForm>,
    organization_form: Option<ConfigForm>,
}

impl IntegrationRow {
    pub fn new(
        org_id: impl Into<String>,
        project_id: impl Into<String>,
        integration: Integration,
    ) -> Self {
        let org_id = org_id.into();
        let project_id = project_id.into();

        let project_form = (!integration.config_project.is_empty()).then(|| {
            ConfigForm::new(
                ConfigTarget::Project {
                    org_id: org_id.clone(),
                    project_id: project_id.clone(),
                    integration_id: integration.id.clone(),
                },
                integration.config_project.clone(),
                integration
                    .config_data_projects
                    .get(&project_id)
                    .cloned()
                    .unwrap_or_default(),
            )
        });

        let organization_form = (!integration.config_organization.is_empty()).then(|| {
            ConfigForm::new(
                ConfigTarget::Organization {
                    org_id: org_id.clone(),
                    integration_id: integration.id.clone(),
                },
                integration.config_organization.clone(),
                integration.config_data.clone(),
            )
        });

        Self {
            org_id,
            project_id,
            integration,
            configuring: false,
            project_form,
            organization_form,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn integration(&self) -> &Integration {
        &self.integration
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn is_enabled_for_project(&self) -> bool {
        self.integration.is_enabled_for(&self.project_id)
    }

    pub fn has_configuration(&self) -> bool {
        self.integration.has_configuration()
    }

    pub fn is_configuring(&self) -> bool {
        self.configuring
    }

    /// Disabled integrations are drawn greyed out.
    pub fn is_dimmed(&self) -> bool {
        self.integration.is_disabled()
    }

    pub fn icon(&self) -> IconView {
        match &self.integration.icon {
            Some(url) if !url.is_empty() => IconView::Image {
                url: url.clone(),
                size: ICON_SIZE,
            },
            _ => IconView::Plugin {
                provider_key: self.integration.provider.key.clone(),
                size: ICON_SIZE,
            },
        }
    }

    /// Shown only for providers that support per-project enablement.
    pub fn enable_switch(&self) -> Option<SwitchView> {
        self.integration
            .provider
            .can_add_project
            .then(|| SwitchView {
                active: self.is_enabled_for_project(),
                tooltip: ENABLE_TOOLTIP,
            })
    }

    /// Shown only when there is something to configure; disabled unless the
    /// integration is enabled for this project.
    pub fn configure_button(&self) -> Option<ConfigureButton> {
        self.has_configuration().then(|| ConfigureButton {
            disabled: !self.is_enabled_for_project(),
            primary: self.configuring,
        })
    }

    pub fn removal_action(&self) -> RemovalAction {
        let provider = &self.integration.provider;
        let upstream_managed = UPSTREAM_MANAGED_PROVIDERS.contains(&provider.key.as_str());
        if self.integration.status == IntegrationStatus::Active && upstream_managed {
            RemovalAction::Disable {
                confirm_text: UPSTREAM_CONFIRM_TEXT,
                message: format!(
                    "You must uninstall this integration from {} in order to delete this integration.",
                    provider.key
                ),
            }
        } else {
            RemovalAction::Remove {
                disabled: self.integration.is_disabled(),
                message: REMOVE_MESSAGE,
            }
        }
    }

    pub fn configuration_visible(&self) -> bool {
        self.configuring && self.is_enabled_for_project()
    }

    pub fn configuration(&self) -> Option<ConfigurationView<'_>> {
        if !self.configuration_visible() {
            return None;
        }
        Some(ConfigurationView {
            project: self.project_form.as_ref(),
            organization: self
                .organization_form
                .as_ref()
                .map(|form| OrganizationSection {
                    alert: ORGANIZATION_SCOPE_ALERT,
                    form,
                }),
        })
    }

    pub fn form(&self, scope: ConfigScope) -> Option<&ConfigForm> {
        match scope {
            ConfigScope::Project => self.project_form.as_ref(),
            ConfigScope::Organization => self.organization_form.as_ref(),
        }
    }

    /// Editable form; only reachable while the configuration is visible.
    pub fn form_mut(&mut self, scope: ConfigScope) -> Option<&mut ConfigForm> {
        if !self.configuration_visible() {
            return None;
        }
        match scope {
            ConfigScope::Project => self.project_form.as_mut(),
            ConfigScope::Organization => self.organization_form.as_mut(),
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Flip the enable switch. Returns false when the switch is not shown.
    pub fn toggle_enabled(&self, handler: &mut dyn IntegrationRowHandler) -> bool {
        if !self.integration.provider.can_add_project {
            return false;
        }
        handler.on_toggle_enabled(!self.is_enabled_for_project());
        true
    }

    /// Click on "Configure". Ignored when the button is absent or disabled.
    pub fn on_configure(&mut self) -> bool {
        match self.configure_button() {
            Some(button) if !button.disabled => {
                self.configuring = !self.configuring;
                true
            }
            _ => false,
        }
    }

    /// The user confirmed the removal dialog. Returns false when the action
    /// is disabled and nothing was dispatched.
    pub fn confirm_removal(&self, handler: &mut dyn IntegrationRowHandler) -> bool {
        match self.removal_action() {
            RemovalAction::Disable { .. } => {
                handler.on_disable(&self.integration);
                true
            }
            RemovalAction::Remove { disabled: true, .. } => false,
            RemovalAction::Remove { .. } => {
                handler.on_remove();
                true
            }
        }
    }

    pub fn view(&self) -> IntegrationRowView {
        let configuration = self.configuration().map(|c| ConfigurationSummary {
            project_fields: c.project.map(ConfigForm::field_views),
            organization_alert: c.organization.map(|o| o.alert),
            organization_fields: c.organization.map(|o| o.form.field_views()),
        });

        IntegrationRowView {
            id: self.integration.id.clone(),
            name: self.integration.name.clone(),
            domain_name: self.integration.domain_name.clone(),
            icon: self.icon(),
            dimmed: self.is_dimmed(),
            enable_switch: self.enable_switch(),
            configure_button: self.configure_button(),
            removal: self.removal_action(),
            configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{IntentRecorder, RowIntent};
    use serde_json::{json, Value};

    fn integration(overrides: Value) -> Integration {
        let mut base = json!({
            "id": "42",
            "name": "acme",
            "domainName": "acme.example.com",
            "icon": "https://cdn.example.com/acme.png",
            "status": "active",
            "provider": {"key": "jira", "name": "Jira", "canAddProject": true},
            "configProject": [{"name": "priority", "type": "select",
                "choices": [["high", "High"], ["low", "Low"]]}],
            "configOrganization": [],
            "configData": {},
            "configDataProjects": {"p1": {"priority": "high"}}
        });
        if let (Some(obj), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    fn row(overrides: Value) -> IntegrationRow {
        IntegrationRow::new("acme-org", "p1", integration(overrides))
    }

    #[test]
    fn switch_tracks_project_membership() {
        let enabled = row(json!({}));
        assert_eq!(enabled.enable_switch().map(|s| s.active), Some(true));

        let other = IntegrationRow::new("acme-org", "p2", integration(json!({})));
        assert_eq!(other.enable_switch().map(|s| s.active), Some(false));

        let empty_config = row(json!({"configDataProjects": {"p1": {}}}));
        assert_eq!(empty_config.enable_switch().map(|s| s.active), Some(true));
    }

    #[test]
    fn switch_hidden_when_provider_cannot_add_project() {
        let r = row(json!({"provider": {"key": "jira", "canAddProject": false}}));
        assert!(r.enable_switch().is_none());

        let mut rec = IntentRecorder::new();
        assert!(!r.toggle_enabled(&mut rec));
        assert!(rec.intents.is_empty());
    }

    #[test]
    fn toggle_requests_negated_state() {
        let mut rec = IntentRecorder::new();
        assert!(row(json!({})).toggle_enabled(&mut rec));

        let disabled_here = row(json!({"configDataProjects": {}}));
        assert!(disabled_here.toggle_enabled(&mut rec));

        assert_eq!(
            rec.take(),
            vec![RowIntent::ToggleEnabled(false), RowIntent::ToggleEnabled(true)]
        );
    }

    #[test]
    fn configure_disabled_when_not_enabled_for_project() {
        let mut r = row(json!({"configDataProjects": {"other": {}}}));
        let button = r.configure_button().unwrap();
        assert!(button.disabled);
        assert!(!button.primary);

        assert!(!r.on_configure());
        assert!(!r.is_configuring());
        assert!(r.configure_button().unwrap().disabled);
        assert!(r.configuration().is_none());
    }

    #[test]
    fn configure_button_hidden_without_fields() {
        let mut r = row(json!({"configProject": [], "configOrganization": []}));
        assert!(r.configure_button().is_none());
        assert!(!r.on_configure());
    }

    #[test]
    fn configure_toggles_visibility() {
        let mut r = row(json!({}));
        assert!(r.configuration().is_none());

        assert!(r.on_configure());
        assert!(r.configure_button().unwrap().primary);
        let view = r.configuration().unwrap();
        assert!(view.project.is_some());
        assert!(view.organization.is_none());

        assert!(r.on_configure());
        assert!(r.configuration().is_none());
    }

    #[test]
    fn organization_only_form_renders_with_alert() {
        let mut r = row(json!({
            "configProject": [],
            "configOrganization": [{"name": "token"}],
            "configData": {"token": "abc"}
        }));
        assert!(r.on_configure());

        let view = r.configuration().unwrap();
        assert!(view.project.is_none());
        let org = view.organization.unwrap();
        assert_eq!(org.alert, ORGANIZATION_SCOPE_ALERT);
        assert_eq!(org.form.fields().len(), 1);
        assert_eq!(org.form.value("token"), Some(&json!("abc")));
        assert!(org.form.target().is_organization());
    }

    #[test]
    fn project_form_targets_project_endpoint_with_project_values() {
        let r = row(json!({}));
        let form = r.form(ConfigScope::Project).unwrap();
        assert_eq!(
            form.target().path(),
            "projects/acme-org/p1/integrations/42/"
        );
        assert_eq!(form.value("priority"), Some(&json!("high")));
    }

    #[test]
    fn forms_are_editable_only_while_visible() {
        let mut r = row(json!({}));
        assert!(r.form_mut(ConfigScope::Project).is_none());

        r.on_configure();
        let form = r.form_mut(ConfigScope::Project).unwrap();
        form.set_value("priority", "low").unwrap();
        let req = form.on_blur("priority").unwrap();
        assert_eq!(req.body(), json!({"config": {"priority": "low"}}));
    }

    #[test]
    fn active_github_row_offers_upstream_disable() {
        let r = row(json!({"provider": {"key": "github", "canAddProject": true}}));
        let action = r.removal_action();
        assert!(matches!(
            action,
            RemovalAction::Disable { confirm_text: UPSTREAM_CONFIRM_TEXT, .. }
        ));
        assert!(action.message().contains("from github"));

        let mut rec = IntentRecorder::new();
        assert!(r.confirm_removal(&mut rec));
        assert_eq!(
            rec.take(),
            vec![RowIntent::Disable {
                integration_id: "42".into(),
                provider_key: "github".into(),
            }]
        );
    }

    #[test]
    fn disabled_github_row_gets_inert_remove() {
        let r = row(json!({
            "status": "disabled",
            "provider": {"key": "github", "canAddProject": true}
        }));
        let action = r.removal_action();
        assert!(action.is_disabled());
        assert_eq!(action.message(), REMOVE_MESSAGE);
        assert!(r.is_dimmed());

        let mut rec = IntentRecorder::new();
        assert!(!r.confirm_removal(&mut rec));
        assert!(rec.intents.is_empty());
    }

    #[test]
    fn other_providers_remove_directly() {
        let r = row(json!({}));
        assert!(!r.removal_action().is_disabled());
        assert!(!r.is_dimmed());

        let mut rec = IntentRecorder::new();
        assert!(r.confirm_removal(&mut rec));
        assert_eq!(rec.take(), vec![RowIntent::Remove]);
    }

    #[test]
    fn icon_falls_back_to_provider_plugin() {
        assert!(matches!(row(json!({})).icon(), IconView::Image { size: 32, .. }));
        assert_eq!(
            row(json!({"icon": null})).icon(),
            IconView::Plugin {
                provider_key: "jira".into(),
                size: ICON_SIZE
            }
        );
    }

    #[test]
    fn view_serializes_visible_configuration() {
        let mut r = row(json!({
            "configOrganization": [{"name": "token", "type": "secret"}],
            "configData": {"token": "s3cret"}
        }));
        assert_eq!(r.view().configuration, None);

        r.on_configure();
        let view = serde_json::to_value(r.view()).unwrap();
        assert_eq!(view["enable_switch"]["active"], json!(true));
        assert_eq!(view["removal"]["kind"], json!("remove"));
        assert_eq!(
            view["configuration"]["organization_alert"],
            json!(ORGANIZATION_SCOPE_ALERT)
        );
        assert_eq!(
            view["configuration"]["organization_fields"][0]["value"],
            json!("********")
        );
        assert_eq!(
            view["configuration"]["project_fields"][0]["value"],
            json!("High")
        );
    }

    #[test]
    fn scope_parses_from_cli_words() {
        assert_eq!("project".parse::<ConfigScope>(), Ok(ConfigScope::Project));
        assert_eq!("org".parse::<ConfigScope>(), Ok(ConfigScope::Organization));
        assert!("global".parse::<ConfigScope>().is_err());
    }
}
