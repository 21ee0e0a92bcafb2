//! Lenient deserialization for model output.
//!
//! The wire structs in each mapper use these `deserialize_with` helpers so that a
//! field of the wrong type becomes `None` instead of failing the whole object.
//! Defaults are then applied in one place per task.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::llm_client::sanitize::{sanitize, strip_fence_markers, strip_fences};

/// Parses model output as JSON, trying the raw text, then the fence-stripped text,
/// then the sanitized JSON substring. Returns `None` if none of them parse.
pub fn parse_model_output(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }
    let unfenced = strip_fences(raw);
    if let Ok(value) = serde_json::from_str(unfenced) {
        return Some(value);
    }
    serde_json::from_str(&sanitize(raw)).ok()
}

/// Decodes a wire struct from a parsed value, falling back to the all-defaults struct
/// when the value is absent or not an object.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: Option<Value>) -> T {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Integer from a JSON integer, float (rounded) or numeric string.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64),
        _ => None,
    }
}

/// Cleans a string field: fence markers stripped, surrounding whitespace trimmed.
pub fn clean_text(value: &Value) -> Option<String> {
    value.as_str().map(strip_fence_markers)
}

pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(as_integer(&value))
}

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(clean_text(&value))
}

/// A list of strings. Non-string elements are dropped; string elements are kept in
/// order, empty ones included. A bare string is accepted as a one-element list.
pub fn string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        Value::String(_) => vec![value],
        _ => return Ok(None),
    };

    Ok(Some(
        items
            .iter()
            .filter_map(clean_text)
            .collect(),
    ))
}

/// A list of raw items, left for the caller to map one by one.
pub fn items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items)),
        _ => Ok(None),
    }
}
