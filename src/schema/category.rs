//! Category create/update payloads.
//!
//! `CategoryFields` declares the per-field constraints once. The create
//! schema adds presence on top of it; the update schema is the partial form
//! that only checks fields which were supplied.

use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use super::{expect_string_fields, ValidationError};

pub const NAME_REQUIRED: &str = "Category name is required";
pub const LABEL_REQUIRED: &str = "Category label is required";

const FIELDS: [(&str, &str); 2] = [("name", NAME_REQUIRED), ("label", LABEL_REQUIRED)];

#[derive(Debug, Validate)]
struct CategoryFields {
    #[validate(length(min = 1, message = "Category name is required"))]
    name: Option<String>,
    #[validate(length(min = 1, message = "Category label is required"))]
    label: Option<String>,
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub label: String,
}

/// Validated partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub label: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.label.is_none()
    }
}

fn parse_fields(input: &Value) -> Result<CategoryFields, ValidationError> {
    let field_names: Vec<&str> = FIELDS.iter().map(|(field, _)| *field).collect();
    let object = expect_string_fields(input, &field_names)?;

    Ok(CategoryFields {
        name: object.get("name").and_then(Value::as_str).map(str::to_string),
        label: object.get("label").and_then(Value::as_str).map(str::to_string),
    })
}

fn check(fields: &CategoryFields, require_all: bool) -> Result<(), ValidationError> {
    let mut error = ValidationError::new("Invalid category");

    if let Err(errors) = fields.validate() {
        error.absorb(&errors);
    }

    if require_all {
        let present = [fields.name.is_some(), fields.label.is_some()];
        for ((field, message), present) in FIELDS.iter().zip(present) {
            if !present {
                error.field_errors.entry(field.to_string()).or_insert_with(|| message.to_string());
            }
        }
    }

    if error.is_empty() {
        Ok(())
    } else {
        Err(error)
    }
}

/// Validate a create payload: both fields required and non-empty.
pub fn validate_create(input: &Value) -> Result<NewCategory, ValidationError> {
    let fields = parse_fields(input)?;
    check(&fields, true)?;

    match (fields.name, fields.label) {
        (Some(name), Some(label)) => Ok(NewCategory { name, label }),
        // check() already reported the missing field
        _ => Err(ValidationError::new("Invalid category")),
    }
}

/// Validate an update payload: no field required, present fields non-empty.
pub fn validate_update(input: &Value) -> Result<CategoryPatch, ValidationError> {
    let fields = parse_fields(input)?;
    check(&fields, false)?;

    Ok(CategoryPatch {
        name: fields.name,
        label: fields.label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_accepts_non_empty_fields() {
        for (name, label) in [("a", "b"), ("groceries", "Groceries"), (" ", "x")] {
            let category = validate_create(&json!({ "name": name, "label": label })).unwrap();
            assert_eq!(category, NewCategory { name: name.to_string(), label: label.to_string() });
        }
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let err = validate_create(&json!({ "name": "", "label": "x" })).unwrap_err();
        assert_eq!(err.field("name"), Some(NAME_REQUIRED));
        assert_eq!(err.field("label"), None);
    }

    #[test]
    fn test_create_rejects_missing_name() {
        let err = validate_create(&json!({ "label": "x" })).unwrap_err();
        assert_eq!(err.field("name"), Some(NAME_REQUIRED));
        assert_eq!(err.summary(), "name: Category name is required");
    }

    #[test]
    fn test_create_reports_every_field() {
        let err = validate_create(&json!({})).unwrap_err();
        assert_eq!(err.field_errors.len(), 2);
        assert_eq!(err.field("label"), Some(LABEL_REQUIRED));
    }

    #[test]
    fn test_create_treats_null_as_missing() {
        let err = validate_create(&json!({ "name": null, "label": "x" })).unwrap_err();
        assert_eq!(err.field("name"), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_create_rejects_wrong_types() {
        let err = validate_create(&json!({ "name": 5, "label": "x" })).unwrap_err();
        assert_eq!(err.field("name"), Some("Expected string, received number"));

        let err = validate_create(&json!(["name"])).unwrap_err();
        assert!(err.field_errors.is_empty());
        assert_eq!(err.message, "Expected an object, received array");
    }

    #[test]
    fn test_create_ignores_unknown_fields() {
        let category = validate_create(&json!({ "name": "n", "label": "l", "extra": true })).unwrap();
        assert_eq!(category.name, "n");
    }

    #[test]
    fn test_update_requires_nothing() {
        let patch = validate_update(&json!({})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_rejects_empty_name() {
        let err = validate_update(&json!({ "name": "" })).unwrap_err();
        assert_eq!(err.field("name"), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_update_leaves_absent_fields_unspecified() {
        let patch = validate_update(&json!({ "label": "ok" })).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.label.as_deref(), Some("ok"));
    }
}
