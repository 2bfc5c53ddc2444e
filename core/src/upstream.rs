//! Field lookups over loosely-shaped upstream JSON.
//!
//! The analysis service has shipped several payload shapes over time; every
//! reader goes through these helpers so a renamed or stringified field
//! degrades to the next alias instead of failing.

use serde_json::Value;

/// First field among `keys` that is present and not null.
pub fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|candidate| !candidate.is_null())
}

/// Reads a finite number, accepting numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn first_number(value: &Value, keys: &[&str]) -> Option<f64> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(as_number)
}

pub fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|candidate| match candidate {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}

pub fn first_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|candidate| match candidate {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Value::Number(number) => number.as_f64().map(|v| v != 0.0),
            _ => None,
        })
}

/// Extracts a list either from a bare array or from the first wrapper key
/// that holds one (`{"data": [...]}` and friends).
pub fn list_items<'a>(value: &'a Value, wrappers: &[&str]) -> &'a [Value] {
    match value {
        Value::Array(items) => items,
        Value::Object(_) => wrappers
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Unwraps `{"success": .., "data": {...}}` envelopes; other values pass through.
pub fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}
