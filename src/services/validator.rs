//! Field validator
//!
//! Pure shape validation for submitted post payloads. Every required field
//! is checked regardless of earlier failures, and errors come back in field
//! declaration order. Decode errors and missing-field errors share this one
//! reporting path; a payload only becomes a typed [`PostInput`] once the
//! list is empty.

use serde_json::Value;

use crate::models::{PostInput, RawPostPayload, ValidationError};

/// Expected primitive type for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    String,
    Number,
}

/// Validate a raw post payload.
///
/// Returns the typed input on success, or the full ordered list of
/// field-level errors. Never short-circuits: a payload missing three
/// fields reports three errors.
pub fn validate_post(payload: &RawPostPayload) -> Result<PostInput, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let fields: [(&str, &str, FieldType, &Option<Value>); 6] = [
        ("title", "Title", FieldType::String, &payload.title),
        ("image", "Image", FieldType::String, &payload.image),
        (
            "category_id",
            "Category ID",
            FieldType::Number,
            &payload.category_id,
        ),
        (
            "description",
            "Description",
            FieldType::String,
            &payload.description,
        ),
        ("content", "Content", FieldType::String, &payload.content),
        ("status_id", "Status ID", FieldType::Number, &payload.status_id),
    ];

    for (key, label, expected, value) in &fields {
        check_field(key, label, *expected, value, &mut errors);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // All checks passed; the unwraps below cannot fire
    Ok(PostInput {
        title: as_string(&payload.title),
        image: as_string(&payload.image),
        category_id: as_number(&payload.category_id),
        description: as_string(&payload.description),
        content: as_string(&payload.content),
        status_id: as_number(&payload.status_id),
    })
}

fn check_field(
    key: &str,
    label: &str,
    expected: FieldType,
    value: &Option<Value>,
    errors: &mut Vec<ValidationError>,
) {
    // Absent, null, and empty string all count as missing
    let missing = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) if s.is_empty() => true,
        _ => false,
    };
    if missing {
        errors.push(ValidationError::new(key, format!("{} is required", label)));
        return;
    }

    let Some(value) = value else { return };
    let type_ok = match expected {
        FieldType::String => value.is_string(),
        FieldType::Number => is_integral(value),
    };
    if !type_ok {
        let type_name = match expected {
            FieldType::String => "string",
            FieldType::Number => "number",
        };
        errors.push(ValidationError::new(
            key,
            format!("{} must be a {}", label, type_name),
        ));
    }
}

/// Ids must be whole numbers; a fractional value is a type error rather
/// than something to silently truncate
fn is_integral(value: &Value) -> bool {
    value.as_i64().is_some()
        || value.as_u64().is_some()
        || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn as_string(value: &Option<Value>) -> String {
    value
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn as_number(value: &Option<Value>) -> i64 {
    let value = value.as_ref().unwrap_or(&Value::Null);
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or_default()
}
