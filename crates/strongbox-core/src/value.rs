use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A value read back from the store after tolerant deserialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// The text parsed as JSON.
    Json(Value),
    /// The text was not valid JSON and is returned as-is.
    Text(String),
}

impl StoredValue {
    /// Parse `text` as JSON, falling back to the raw text on any parse error.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => StoredValue::Json(value),
            Err(_) => StoredValue::Text(text.to_string()),
        }
    }

    /// The empty sentinel returned for absent or unreadable records.
    pub fn empty() -> Self {
        StoredValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StoredValue::Text(text) if text.is_empty())
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StoredValue::Json(value) => Some(value),
            StoredValue::Text(_) => None,
        }
    }

    /// Text form; JSON is re-serialized compactly.
    pub fn into_text(self) -> String {
        match self {
            StoredValue::Json(value) => value.to_string(),
            StoredValue::Text(text) => text,
        }
    }
}

impl Default for StoredValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Json(value) => write!(f, "{value}"),
            StoredValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<Value> for StoredValue {
    fn from(value: Value) -> Self {
        StoredValue::Json(value)
    }
}
