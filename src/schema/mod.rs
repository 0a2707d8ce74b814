//! Request payload schemas.
//!
//! Each schema validates an untyped JSON body and yields the typed value the
//! rest of the crate works with. Failures carry one message per offending
//! field and are never coerced into a default.

pub mod category;
pub mod transaction;

use serde_json::Value;
use std::collections::BTreeMap;

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors.insert(field.into(), message.into());
        self
    }

    pub fn field(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Merge the errors reported by a `validator` derive, keeping the first
    /// message per field.
    pub fn absorb(&mut self, errors: &validator::ValidationErrors) {
        for (field, violations) in errors.field_errors() {
            let message = violations
                .iter()
                .find_map(|v| v.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field));
            self.field_errors.entry(field.to_string()).or_insert(message);
        }
    }

    /// "name: Category name is required; label: ..." for logs and CLI output
    pub fn summary(&self) -> String {
        if self.field_errors.is_empty() {
            return self.message.clone();
        }
        self.field_errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Require a JSON object and reject non-string values for the given fields.
/// `null` counts as absent.
pub(crate) fn expect_string_fields<'a>(
    input: &'a Value,
    fields: &[&str],
) -> Result<&'a serde_json::Map<String, Value>, ValidationError> {
    let object = input
        .as_object()
        .ok_or_else(|| ValidationError::new(format!("Expected an object, received {}", json_type(input))))?;

    let mut error = ValidationError::new("Invalid request body");
    for field in fields {
        match object.get(*field) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => {
                error = error.with_field(*field, format!("Expected string, received {}", json_type(other)));
            }
        }
    }

    if error.is_empty() {
        Ok(object)
    } else {
        Err(error)
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
