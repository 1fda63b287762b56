//! Save-on-blur configuration form.
//!
//! There is no submit step. Each field is saved on its own when it loses
//! focus and differs from the last value the server accepted. Every
//! accepted save can be undone, most recent first.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::field::FieldDescriptor;
use crate::api::{ConfigTarget, IntegrationApi};
use crate::error::{Result, ValidationError};

/// A single-field save, ready to be POSTed as `{"config": {field: value}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub target: ConfigTarget,
    pub field: String,
    pub value: Value,
    /// Restores an earlier value; committing it does not push another undo step.
    pub undo: bool,
}

impl SaveRequest {
    /// The `config` map sent to the backend.
    pub fn config(&self) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert(self.field.clone(), self.value.clone());
        config
    }

    /// Full request body.
    pub fn body(&self) -> Value {
        json!({ "config": self.config() })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct UndoEntry {
    field: String,
    previous: Value,
}

/// Render data for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
    pub required: bool,
    pub readonly: bool,
    pub dirty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Descriptor-driven form bound to one endpoint.
#[derive(Debug, Clone)]
pub struct ConfigForm {
    target: ConfigTarget,
    fields: Vec<FieldDescriptor>,
    saved: Map<String, Value>,
    values: Map<String, Value>,
    undo_stack: Vec<UndoEntry>,
}

impl ConfigForm {
    pub fn new(target: ConfigTarget, fields: Vec<FieldDescriptor>, initial: Map<String, Value>) -> Self {
        Self {
            target,
            fields,
            values: initial.clone(),
            saved: initial,
            undo_stack: Vec::new(),
        }
    }

    pub fn target(&self) -> &ConfigTarget {
        &self.target
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Current value: the edited one, else the stored one, else the field default.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values
            .get(name)
            .or_else(|| self.field(name).and_then(|f| f.default.as_ref()))
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.values.get(name).unwrap_or(&Value::Null) != self.saved.get(name).unwrap_or(&Value::Null)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Edit a field from raw input. The value is validated here; nothing is
    /// sent until [`ConfigForm::on_blur`].
    pub fn set_value(&mut self, name: &str, raw: &str) -> Result<&Value, ValidationError> {
        let field = self
            .field(name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
        let value = field.coerce(raw)?;
        self.values.insert(name.to_string(), value);
        Ok(&self.values[name])
    }

    /// Field lost focus: produce a save if it changed since the last save.
    pub fn on_blur(&self, name: &str) -> Option<SaveRequest> {
        self.field(name)?;
        if !self.is_dirty(name) {
            return None;
        }
        Some(SaveRequest {
            target: self.target.clone(),
            field: name.to_string(),
            value: self.values.get(name).cloned().unwrap_or(Value::Null),
            undo: false,
        })
    }

    /// Record that the server accepted `request`.
    pub fn commit(&mut self, request: &SaveRequest) {
        let previous = self
            .saved
            .insert(request.field.clone(), request.value.clone())
            .unwrap_or(Value::Null);
        if !request.undo {
            self.undo_stack.push(UndoEntry {
                field: request.field.clone(),
                previous,
            });
        }
    }

    /// Roll the most recently saved field back to its previous value.
    ///
    /// The local value changes immediately; the returned request persists it.
    pub fn undo(&mut self) -> Option<SaveRequest> {
        let entry = self.undo_stack.pop()?;
        self.values.insert(entry.field.clone(), entry.previous.clone());
        Some(SaveRequest {
            target: self.target.clone(),
            field: entry.field,
            value: entry.previous,
            undo: true,
        })
    }

    /// Blur `name` and, if it changed, save it through `api`.
    ///
    /// Returns whether a request was sent. On failure the value stays dirty
    /// and nothing is retried.
    pub async fn save_field<A>(&mut self, api: &A, name: &str) -> Result<bool>
    where
        A: IntegrationApi + ?Sized,
    {
        let Some(request) = self.on_blur(name) else {
            return Ok(false);
        };
        self.send(api, request).await?;
        Ok(true)
    }

    /// Undo the last save and persist the restored value.
    ///
    /// If the request fails the undo step stays on the stack and the field
    /// shows the last saved value again.
    pub async fn undo_last<A>(&mut self, api: &A) -> Result<bool>
    where
        A: IntegrationApi + ?Sized,
    {
        let Some(entry) = self.undo_stack.last().cloned() else {
            return Ok(false);
        };
        let Some(request) = self.undo() else {
            return Ok(false);
        };
        if let Err(e) = self.send(api, request).await {
            let saved = self.saved.get(&entry.field).cloned().unwrap_or(Value::Null);
            self.values.insert(entry.field.clone(), saved);
            self.undo_stack.push(entry);
            return Err(e);
        }
        Ok(true)
    }

    async fn send<A>(&mut self, api: &A, request: SaveRequest) -> Result<()>
    where
        A: IntegrationApi + ?Sized,
    {
        match api.save_config(&request.target, &request.config()).await {
            Ok(()) => {
                tracing::info!(
                    integration_id = request.target.integration_id(),
                    field = %request.field,
                    organization_scope = request.target.is_organization(),
                    "integration config saved"
                );
                self.commit(&request);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    integration_id = request.target.integration_id(),
                    field = %request.field,
                    error = %e,
                    "integration config save failed"
                );
                Err(e.into())
            }
        }
    }

    pub fn field_views(&self) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|f| FieldView {
                name: f.name.clone(),
                label: f.display_label().to_string(),
                kind: f.kind.type_name(),
                value: f.display_value(self.value(&f.name)),
                required: f.required,
                readonly: f.readonly,
                dirty: self.is_dirty(&f.name),
                help: f.help.clone(),
                placeholder: f.placeholder.clone(),
            })
            .collect()
    }
}
