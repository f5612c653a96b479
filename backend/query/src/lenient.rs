//! Serde helpers that never reject a field.
//!
//! The backend has shipped ids and quantities as both numbers and strings,
//! and nulls almost anywhere.
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::records::RecordId;

/// Strings stay strings, numbers and booleans are stringified, anything else is `None`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_text(&Value::deserialize(deserializer)?))
}

pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer ids stay numeric, everything scalar else becomes text.
pub fn id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(
            n.as_i64()
                .map(RecordId::Number)
                .unwrap_or_else(|| RecordId::Text(n.to_string())),
        ),
        Value::String(s) => Some(RecordId::Text(s)),
        _ => None,
    })
}

/// Falls back to `T::default()` when the value does not fit.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Non-negative integers, or integer strings. Anything else is `None`.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Sequences tolerate `null` and non-array values by becoming empty.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(snapshot(Value::deserialize(deserializer)?))
}

/// Every element of a JSON array that parses as `T`. Non-arrays are empty.
pub fn snapshot<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}
