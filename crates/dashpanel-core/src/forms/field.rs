//! Field descriptors: configuration fields described as data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// One selectable option of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Input kind, tagged by the payload's `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Secret,
    Textarea,
    Number,
    Boolean,
    Email,
    Url,
    Select { choices: Vec<Choice> },
}

/// A configuration field as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldDescriptor")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldDescriptor {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default, alias = "readOnly")]
    readonly: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    choices: Option<Vec<(Value, String)>>,
}

impl TryFrom<RawFieldDescriptor> for FieldDescriptor {
    type Error = String;

    fn try_from(raw: RawFieldDescriptor) -> Result<Self, Self::Error> {
        if raw.name.is_empty() {
            return Err("field descriptor without a name".to_string());
        }

        let kind = match raw.kind.as_deref().unwrap_or("text") {
            "text" | "string" => FieldKind::Text,
            "secret" | "password" => FieldKind::Secret,
            "textarea" => FieldKind::Textarea,
            "number" => FieldKind::Number,
            "boolean" | "bool" => FieldKind::Boolean,
            "email" => FieldKind::Email,
            "url" => FieldKind::Url,
            "select" | "choice" => FieldKind::Select {
                choices: raw
                    .choices
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(value, label)| Choice {
                        value: value_to_plain_string(&value),
                        label,
                    })
                    .collect(),
            },
            other => {
                tracing::debug!(field = %raw.name, kind = other, "unknown field type, treating as text");
                FieldKind::Text
            }
        };

        Ok(FieldDescriptor {
            name: raw.name,
            label: raw.label,
            help: raw.help,
            placeholder: raw.placeholder,
            required: raw.required,
            readonly: raw.readonly,
            default: raw.default,
            kind,
        })
    }
}

fn value_to_plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Secret => "secret",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Select { .. } => "select",
        }
    }
}

impl FieldDescriptor {
    /// Label to display, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Turn raw user input into the JSON value sent to the backend.
    ///
    /// Empty input clears the field (`null`) unless the field is required.
    pub fn coerce(&self, raw: &str) -> Result<Value, ValidationError> {
        if self.readonly {
            return Err(ValidationError::ReadOnly(self.name.clone()));
        }

        let input = raw.trim();
        if input.is_empty() {
            if self.required {
                return Err(ValidationError::Required {
                    field: self.name.clone(),
                });
            }
            return Ok(Value::Null);
        }

        let invalid = |message: String| ValidationError::InvalidValue {
            field: self.name.clone(),
            message,
        };

        match &self.kind {
            // Free text keeps inner and surrounding whitespace as typed.
            FieldKind::Text | FieldKind::Secret | FieldKind::Textarea => {
                Ok(Value::String(raw.to_string()))
            }
            FieldKind::Number => {
                if let Ok(n) = input.parse::<i64>() {
                    Ok(Value::from(n))
                } else {
                    input
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .ok_or_else(|| invalid(format!("'{input}' is not a number")))
                }
            }
            FieldKind::Boolean => match input.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(invalid(format!("'{input}' is not a boolean"))),
            },
            FieldKind::Email => {
                let valid = input
                    .split_once('@')
                    .is_some_and(|(user, host)| !user.is_empty() && host.contains('.'))
                    && !input.contains(char::is_whitespace);
                if valid {
                    Ok(Value::String(input.to_string()))
                } else {
                    Err(invalid(format!("'{input}' is not an email address")))
                }
            }
            FieldKind::Url => match url::Url::parse(input) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    Ok(Value::String(input.to_string()))
                }
                _ => Err(invalid(format!("'{input}' is not an http(s) URL"))),
            },
            FieldKind::Select { choices } => choices
                .iter()
                .find(|c| c.value == input || c.label == input)
                .map(|c| Value::String(c.value.clone()))
                .ok_or_else(|| {
                    let allowed: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
                    invalid(format!("expected one of: {}", allowed.join(", ")))
                }),
        }
    }

    /// Render a value for display; secrets are masked.
    pub fn display_value(&self, value: Option<&Value>) -> String {
        let value = match value {
            None | Some(Value::Null) => return String::new(),
            Some(v) => v,
        };
        match &self.kind {
            FieldKind::Secret => "********".to_string(),
            FieldKind::Select { choices } => {
                let plain = value_to_plain_string(value);
                choices
                    .iter()
                    .find(|c| c.value == plain)
                    .map(|c| c.label.clone())
                    .unwrap_or(plain)
            }
            _ => value_to_plain_string(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(json: Value) -> FieldDescriptor {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let f = field(json!({"name": "token"}));
        assert_eq!(f.kind, FieldKind::Text);
        assert_eq!(f.display_label(), "token");
        assert!(!f.required);
    }

    #[test]
    fn aliases_map_to_kinds() {
        assert_eq!(field(json!({"name": "a", "type": "bool"})).kind, FieldKind::Boolean);
        assert_eq!(field(json!({"name": "a", "type": "string"})).kind, FieldKind::Text);
        let select = field(json!({
            "name": "region", "type": "choice",
            "choices": [["us", "United States"], [2, "Europe"]]
        }));
        match select.kind {
            FieldKind::Select { choices } => {
                assert_eq!(choices[0].value, "us");
                assert_eq!(choices[1].value, "2");
                assert_eq!(choices[1].label, "Europe");
            }
            other => panic!("expected select, got {other:?}"),
        }
    }

    #[test]
    fn required_field_rejects_empty_input() {
        let f = field(json!({"name": "token", "required": true}));
        assert_eq!(
            f.coerce("  "),
            Err(ValidationError::Required { field: "token".into() })
        );
    }

    #[test]
    fn optional_field_clears_to_null() {
        let f = field(json!({"name": "note"}));
        assert_eq!(f.coerce(""), Ok(Value::Null));
    }

    #[test]
    fn number_and_boolean_coercion() {
        let n = field(json!({"name": "limit", "type": "number"}));
        assert_eq!(n.coerce("42"), Ok(json!(42)));
        assert_eq!(n.coerce("2.5"), Ok(json!(2.5)));
        assert!(n.coerce("many").is_err());

        let b = field(json!({"name": "resolve", "type": "boolean"}));
        assert_eq!(b.coerce("Yes"), Ok(json!(true)));
        assert_eq!(b.coerce("off"), Ok(json!(false)));
        assert!(b.coerce("maybe").is_err());
    }

    #[test]
    fn email_and_url_shapes() {
        let e = field(json!({"name": "contact", "type": "email"}));
        assert!(e.coerce("ops@example.com").is_ok());
        assert!(e.coerce("ops.example.com").is_err());

        let u = field(json!({"name": "hook", "type": "url"}));
        assert!(u.coerce("https://hooks.example.com/x").is_ok());
        assert!(u.coerce("ftp://example.com").is_err());
    }

    #[test]
    fn select_accepts_value_or_label() {
        let f = field(json!({
            "name": "region", "type": "select",
            "choices": [["us", "United States"], ["eu", "Europe"]]
        }));
        assert_eq!(f.coerce("eu"), Ok(json!("eu")));
        assert_eq!(f.coerce("United States"), Ok(json!("us")));
        assert!(f.coerce("apac").is_err());
        assert_eq!(f.display_value(Some(&json!("eu"))), "Europe");
    }

    #[test]
    fn readonly_rejects_edits() {
        let f = field(json!({"name": "installation", "readonly": true}));
        assert_eq!(
            f.coerce("x"),
            Err(ValidationError::ReadOnly("installation".into()))
        );
    }

    #[test]
    fn secrets_are_masked() {
        let f = field(json!({"name": "token", "type": "secret"}));
        assert_eq!(f.display_value(Some(&json!("abc"))), "********");
        assert_eq!(f.display_value(None), "");
    }
}
