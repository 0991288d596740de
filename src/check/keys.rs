//! Key lookups over parsed JSON payloads.

use std::collections::BTreeSet;

use serde_json::Value;

/// Whether `key` appears anywhere in the mapping tree rooted at `tree`.
///
/// Only object values are descended into. Arrays are leaves here, so
/// `{"a": [{"c": 1}]}` does not contain `c`. Commit payloads rely on this:
/// `commit.author.date` counts, while a `parents` array is not searched.
pub fn contains_key(tree: &Value, key: &str) -> bool {
    match tree {
        Value::Object(map) => {
            map.contains_key(key) || map.values().any(|child| contains_key(child, key))
        }
        Value::Array(_) | Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            false
        }
    }
}

/// Top-level keys of an object, or `None` if the value is not an object.
pub fn top_level_keys(value: &Value) -> Option<BTreeSet<&str>> {
    value
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
}
