use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};
use dashpanel_core::forms::FieldView;
use dashpanel_core::integrations::{
    ConfigScope, IconView, IntegrationRow, IntegrationRowView, IntentRecorder, RemovalAction,
    RowIntent,
};
use dashpanel_core::{ApiClient, Config, IntegrationApi};

use super::{api_client, resolve, CmdResult};

/// Organization and project the rows are shown for.
#[derive(Args, Clone)]
pub struct Scope {
    /// Organization slug (default: dashboard.organization)
    #[arg(long)]
    org: Option<String>,
    /// Project slug (default: dashboard.project)
    #[arg(long)]
    project: Option<String>,
}

#[derive(Subcommand)]
pub enum IntegrationsAction {
    /// List installed integrations
    List {
        #[command(flatten)]
        scope: Scope,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one integration with its configuration
    Show {
        id: String,
        #[command(flatten)]
        scope: Scope,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save configuration fields, one request per changed field
    Configure {
        id: String,
        #[command(flatten)]
        scope: Scope,
        /// Which form to edit: project or organization
        #[arg(long = "scope", default_value = "project")]
        form: ConfigScope,
        /// Field assignment, repeatable (e.g. --set channel=#ops)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Enable the integration for the project
    Enable {
        id: String,
        #[command(flatten)]
        scope: Scope,
    },
    /// Disable the integration for the project
    Disable {
        id: String,
        #[command(flatten)]
        scope: Scope,
    },
    /// Remove the integration from the organization
    Remove {
        id: String,
        #[command(flatten)]
        scope: Scope,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: IntegrationsAction) -> CmdResult {
    let config = Config::load()?;
    let api = api_client(&config)?;

    match action {
        IntegrationsAction::List { scope, json } => {
            let rows = load_rows(&api, &config, &scope).await?;
            let views: Vec<IntegrationRowView> = rows.iter().map(IntegrationRow::view).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else if views.is_empty() {
                println!("no integrations installed");
            } else {
                for view in &views {
                    print_row(view);
                }
            }
        }
        IntegrationsAction::Show { id, scope, json } => {
            let mut row = find_row(&api, &config, &scope, &id).await?;
            row.on_configure();
            let view = row.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_row(&view);
                print_configuration(&view);
            }
        }
        IntegrationsAction::Configure {
            id,
            scope,
            form,
            assignments,
        } => {
            let mut row = find_row(&api, &config, &scope, &id).await?;
            configure(&api, &mut row, form, &assignments).await?;
        }
        IntegrationsAction::Enable { id, scope } => {
            let row = find_row(&api, &config, &scope, &id).await?;
            set_enabled(&api, &row, true).await?;
        }
        IntegrationsAction::Disable { id, scope } => {
            let row = find_row(&api, &config, &scope, &id).await?;
            set_enabled(&api, &row, false).await?;
        }
        IntegrationsAction::Remove { id, scope, yes } => {
            let row = find_row(&api, &config, &scope, &id).await?;
            remove(&api, &row, yes).await?;
        }
    }
    Ok(())
}

async fn load_rows(
    api: &ApiClient,
    config: &Config,
    scope: &Scope,
) -> Result<Vec<IntegrationRow>, Box<dyn std::error::Error>> {
    let org = resolve(scope.org.clone(), &config.dashboard.organization, "org", "dashboard.organization")?;
    let project = resolve(scope.project.clone(), &config.dashboard.project, "project", "dashboard.project")?;
    let integrations = api.fetch_integrations(&org).await?;
    tracing::debug!(org = %org, count = integrations.len(), "integrations loaded");
    Ok(integrations
        .into_iter()
        .map(|i| IntegrationRow::new(org.clone(), project.clone(), i))
        .collect())
}

async fn find_row(
    api: &ApiClient,
    config: &Config,
    scope: &Scope,
    id: &str,
) -> Result<IntegrationRow, Box<dyn std::error::Error>> {
    load_rows(api, config, scope)
        .await?
        .into_iter()
        .find(|row| row.integration().id == id)
        .ok_or_else(|| format!("integration not found: {id}").into())
}

async fn configure(
    api: &ApiClient,
    row: &mut IntegrationRow,
    scope: ConfigScope,
    assignments: &[String],
) -> CmdResult {
    if row.configure_button().is_none() {
        return Err("this integration has nothing to configure".into());
    }
    if !row.on_configure() {
        return Err("enable the integration for this project before configuring it".into());
    }
    let Some(form) = row.form_mut(scope) else {
        return Err(format!("this integration has no {} configuration", scope_name(scope)).into());
    };

    // Validate everything before the first request goes out.
    let mut fields = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE, got '{assignment}'"))?;
        form.set_value(name.trim(), raw)?;
        fields.push(name.trim().to_string());
    }

    for name in fields {
        if form.save_field(api, &name).await? {
            println!("saved {name}");
        } else {
            println!("{name} unchanged");
        }
    }
    Ok(())
}

async fn set_enabled(api: &ApiClient, row: &IntegrationRow, enabled: bool) -> CmdResult {
    if row.is_enabled_for_project() == enabled {
        println!("already {}", if enabled { "enabled" } else { "disabled" });
        return Ok(());
    }
    let mut recorder = IntentRecorder::new();
    if !row.toggle_enabled(&mut recorder) {
        return Err(format!(
            "{} cannot be enabled per project",
            row.integration().provider.display_name()
        )
        .into());
    }
    apply_intents(api, row, recorder.take()).await
}

async fn remove(api: &ApiClient, row: &IntegrationRow, yes: bool) -> CmdResult {
    let action = row.removal_action();
    if action.is_disabled() {
        return Err("this integration is already disabled".into());
    }
    println!("{}", action.message());
    if !yes && !confirm(confirm_label(&action))? {
        println!("aborted");
        return Ok(());
    }

    let mut recorder = IntentRecorder::new();
    row.confirm_removal(&mut recorder);
    apply_intents(api, row, recorder.take()).await
}

async fn apply_intents(api: &ApiClient, row: &IntegrationRow, intents: Vec<RowIntent>) -> CmdResult {
    let integration_id = &row.integration().id;
    for intent in intents {
        match intent {
            RowIntent::ToggleEnabled(true) => {
                api.enable_for_project(row.org_id(), row.project_id(), integration_id)
                    .await?;
                println!("enabled for {}", row.project_id());
            }
            RowIntent::ToggleEnabled(false) => {
                api.disable_for_project(row.org_id(), row.project_id(), integration_id)
                    .await?;
                println!("disabled for {}", row.project_id());
            }
            RowIntent::Remove => {
                api.remove_integration(row.org_id(), integration_id).await?;
                println!("removed {}", row.integration().name);
            }
            RowIntent::Disable { provider_key, .. } => {
                println!("uninstall the app from {provider_key} to finish removing it");
            }
        }
    }
    Ok(())
}

fn confirm(label: &str) -> io::Result<bool> {
    print!("{label}? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn confirm_label(action: &RemovalAction) -> &'static str {
    match action {
        RemovalAction::Disable { confirm_text, .. } => *confirm_text,
        RemovalAction::Remove { .. } => "Remove",
    }
}

fn scope_name(scope: ConfigScope) -> &'static str {
    match scope {
        ConfigScope::Project => "project",
        ConfigScope::Organization => "organization",
    }
}

fn print_row(view: &IntegrationRowView) {
    let icon = match &view.icon {
        IconView::Image { .. } => String::new(),
        IconView::Plugin { provider_key, .. } => format!("[{provider_key}] "),
    };
    let mut flags = Vec::new();
    if view.dimmed {
        flags.push("disabled".to_string());
    }
    if let Some(switch) = &view.enable_switch {
        flags.push(if switch.active { "enabled" } else { "off" }.to_string());
    }
    if let Some(button) = &view.configure_button {
        if !button.disabled {
            flags.push("configurable".to_string());
        }
    }
    println!("{:<8} {icon}{} ({})", view.id, view.name, view.domain_name);
    if !flags.is_empty() {
        println!("         {}", flags.join(", "));
    }
}

fn print_configuration(view: &IntegrationRowView) {
    let Some(config) = &view.configuration else {
        if view.configure_button.is_some_and(|b| b.disabled) {
            println!("  (enable for this project to configure)");
        }
        return;
    };
    if let Some(fields) = &config.project_fields {
        println!("  project settings:");
        print_fields(fields);
    }
    if let Some(fields) = &config.organization_fields {
        if let Some(alert) = config.organization_alert {
            println!("  ! {alert}");
        }
        println!("  organization settings:");
        print_fields(fields);
    }
}

fn print_fields(fields: &[FieldView]) {
    for field in fields {
        let required = if field.required { " *" } else { "" };
        let readonly = if field.readonly { " (read-only)" } else { "" };
        println!("    {}{required} [{}] = {}{readonly}", field.label, field.kind, field.value);
    }
}
