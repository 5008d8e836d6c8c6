//! Payload validation against entity field contracts.
//!
//! Malformed input is an ordinary outcome here: every check returns a
//! [`Validation`] and never an error, so handlers can turn it into a 400.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::Entity;

/// Keys owned by the store; never accepted from a payload.
pub const RESERVED_KEYS: &[&str] = &["_id", "createdAt", "updatedAt"];

/// Shape of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    StringArray,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::StringArray => "array",
        }
    }
}

/// One entry of an entity's field contract.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A single field-level problem with a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub code: &'static str,
    pub path: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<&'static str>,
}

impl FieldViolation {
    fn invalid_type(path: Vec<String>, expected: &'static str, received: &'static str) -> Self {
        let message = if received == "undefined" {
            "Required".to_string()
        } else {
            format!("Expected {expected}, received {received}")
        };
        Self {
            code: "invalid_type",
            path,
            message,
            expected: Some(expected),
            received: Some(received),
        }
    }

    fn too_small(field: &str, message: String) -> Self {
        Self {
            code: "too_small",
            path: vec![field.to_string()],
            message,
            expected: None,
            received: None,
        }
    }

    fn reserved(field: &str) -> Self {
        Self {
            code: "unrecognized_key",
            path: vec![field.to_string()],
            message: format!("`{field}` is assigned by the store and cannot be set"),
            expected: None,
            received: None,
        }
    }
}

/// Outcome of validating a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Vec<FieldViolation>),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn into_result(self) -> Result<T, Vec<FieldViolation>> {
        match self {
            Validation::Valid(v) => Ok(v),
            Validation::Invalid(errors) => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Patch,
}

/// Validate a full create payload and decode it into the entity type.
///
/// Required fields must be present, correctly typed and non-empty. Unknown
/// fields are left alone; whether they survive depends on the entity type.
pub fn validate<E: Entity>(payload: &Value) -> Validation<E> {
    let object = match check(payload, E::FIELDS, Mode::Create) {
        Ok(object) => object,
        Err(errors) => return Validation::Invalid(errors),
    };

    match serde_json::from_value::<E>(Value::Object(object.clone())) {
        Ok(entity) => Validation::Valid(entity),
        Err(e) => Validation::Invalid(vec![FieldViolation {
            code: "custom",
            path: Vec::new(),
            message: e.to_string(),
            expected: None,
            received: None,
        }]),
    }
}

/// Validate a partial update. Nothing is required, but declared fields that
/// are present are type-checked, and required ones must stay non-empty.
pub fn validate_patch<E: Entity>(payload: &Value) -> Validation<Map<String, Value>> {
    match check(payload, E::FIELDS, Mode::Patch) {
        Ok(object) => Validation::Valid(object.clone()),
        Err(errors) => Validation::Invalid(errors),
    }
}

fn check<'a>(
    payload: &'a Value,
    fields: &[FieldRule],
    mode: Mode,
) -> Result<&'a Map<String, Value>, Vec<FieldViolation>> {
    let Some(object) = payload.as_object() else {
        return Err(vec![FieldViolation::invalid_type(
            Vec::new(),
            "object",
            type_name(Some(payload)),
        )]);
    };

    let mut errors = Vec::new();

    for key in RESERVED_KEYS {
        if object.contains_key(*key) {
            errors.push(FieldViolation::reserved(key));
        }
    }

    for rule in fields {
        let value = object.get(rule.name);
        if value.is_none() && (mode == Mode::Patch || !rule.required) {
            continue;
        }
        check_field(rule, value, rule.required, &mut errors);
    }

    if errors.is_empty() {
        Ok(object)
    } else {
        Err(errors)
    }
}

fn check_field(
    rule: &FieldRule,
    value: Option<&Value>,
    enforce_non_empty: bool,
    errors: &mut Vec<FieldViolation>,
) {
    let path = || vec![rule.name.to_string()];
    match (rule.kind, value) {
        (FieldKind::String, Some(Value::String(s))) => {
            if enforce_non_empty && s.trim().is_empty() {
                errors.push(FieldViolation::too_small(
                    rule.name,
                    format!("{} cannot be empty", rule.name),
                ));
            }
        }
        (FieldKind::StringArray, Some(Value::Array(items))) => {
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    errors.push(FieldViolation::invalid_type(
                        vec![rule.name.to_string(), i.to_string()],
                        "string",
                        type_name(Some(item)),
                    ));
                }
            }
            if enforce_non_empty && items.is_empty() {
                errors.push(FieldViolation::too_small(
                    rule.name,
                    format!("{} must contain at least 1 element", rule.name),
                ));
            }
        }
        (kind, other) => {
            errors.push(FieldViolation::invalid_type(
                path(),
                kind.expected(),
                type_name(other),
            ));
        }
    }
}

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
