//! Assertions over `ApiResponse`s. Each returns a typed error describing
//! expected vs actual so a failed check reads on its own.

pub mod keys;

use std::collections::BTreeSet;

use serde_json::Value;

use crate::errors::{ContractError, Result};
use crate::http::ApiResponse;

pub use keys::{contains_key, top_level_keys};

pub fn assert_status(resp: &ApiResponse, expected: u16) -> Result<()> {
    let actual = resp.status_code();
    if actual == expected {
        Ok(())
    } else {
        Err(ContractError::UnexpectedStatus { expected, actual })
    }
}

/// Exact set equality between the object's top-level keys and `expected`.
pub fn assert_fields<S: AsRef<str>>(object: &Value, expected: &[S]) -> Result<()> {
    let actual = top_level_keys(object).ok_or_else(|| {
        ContractError::SchemaMismatch(format!("expected an object, got {}", kind(object)))
    })?;
    let expected: BTreeSet<&str> = expected.iter().map(AsRef::as_ref).collect();

    if actual == expected {
        return Ok(());
    }
    let missing: Vec<&str> = expected.difference(&actual).copied().collect();
    let unexpected: Vec<&str> = actual.difference(&expected).copied().collect();
    Err(ContractError::SchemaMismatch(format!(
        "returned field set does not match: missing {missing:?}, unexpected {unexpected:?}"
    )))
}

/// Every key must be present somewhere in the object's mapping tree.
pub fn assert_nested_keys<S: AsRef<str>>(object: &Value, keys: &[S]) -> Result<()> {
    match keys.iter().find(|k| !contains_key(object, k.as_ref())) {
        Some(k) => Err(ContractError::SchemaMismatch(format!(
            "key `{}` not found in response",
            k.as_ref()
        ))),
        None => Ok(()),
    }
}

pub fn assert_field_eq(object: &Value, field: &str, expected: &str) -> Result<()> {
    match object.get(field) {
        Some(Value::String(s)) if s == expected => Ok(()),
        actual => Err(ContractError::ValueMismatch {
            field: field.to_string(),
            expected: format!("{expected:?}"),
            actual: actual.map_or_else(|| "<absent>".to_string(), Value::to_string),
        }),
    }
}

pub fn assert_header(resp: &ApiResponse, name: &str) -> Result<()> {
    if resp.has_header(name) {
        Ok(())
    } else {
        Err(ContractError::SchemaMismatch(format!("missing `{name}` header")))
    }
}

pub fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| {
        ContractError::SchemaMismatch(format!("expected an array, got {}", kind(value)))
    })
}

pub fn assert_len(value: &Value, expected: usize) -> Result<()> {
    let actual = as_array(value)?.len();
    if actual == expected {
        Ok(())
    } else {
        Err(ContractError::SchemaMismatch(format!(
            "expected {expected} elements, got {actual}"
        )))
    }
}

/// First element of an array body; listing checks validate its shape.
pub fn first_element(value: &Value) -> Result<&Value> {
    as_array(value)?
        .first()
        .ok_or_else(|| ContractError::SchemaMismatch("list is empty".to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
