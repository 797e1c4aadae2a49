//! Raw error-context values.
//!
//! `ContextValue` models the loosely typed data attached to an error:
//! environment entries, parameter maps, and free-form details. Text that
//! came from the outside world and has not been validated is kept as
//! `Bytes`; repairing it into `Text` is the job of [`crate::sanitize`].
//!
//! Maps are ordered by key so the display form is deterministic.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from string keys to context values.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// A value in an error context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Valid UTF-8 text.
    Text(String),
    /// Byte string whose encoding has not been checked.
    Bytes(Vec<u8>),
    List(Vec<ContextValue>),
    Map(ContextMap),
}

impl ContextValue {
    /// Displayable string form used for storage.
    ///
    /// Strings are returned as-is (invalid bytes stripped); every other
    /// value uses its [`fmt::Display`] rendering.
    pub fn display_string(&self) -> String {
        match self {
            ContextValue::Text(s) => s.clone(),
            ContextValue::Bytes(b) => crate::repair_utf8(b).into_owned(),
            other => other.to_string(),
        }
    }
}

/// Quoted, escaped form of a string: `"he said \"hi\""`.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "{:?}", s)
}

/// Quoted form of a byte string, with invalid bytes shown as `\xNN`.
fn write_quoted_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for chunk in bytes.utf8_chunks() {
        let valid = format!("{:?}", chunk.valid());
        f.write_str(&valid[1..valid.len() - 1])?;
        for byte in chunk.invalid() {
            write!(f, "\\x{:02X}", byte)?;
        }
    }
    f.write_str("\"")
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Null => f.write_str("null"),
            ContextValue::Bool(b) => write!(f, "{}", b),
            ContextValue::Integer(i) => write!(f, "{}", i),
            ContextValue::Float(x) => write!(f, "{:?}", x),
            ContextValue::Text(s) => write_quoted(f, s),
            ContextValue::Bytes(b) => write_quoted_bytes(f, b),
            ContextValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ContextValue::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, " => {}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<&[u8]> for ContextValue {
    fn from(b: &[u8]) -> Self {
        ContextValue::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for ContextValue {
    fn from(b: Vec<u8>) -> Self {
        ContextValue::Bytes(b)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        ContextValue::Integer(i)
    }
}

impl From<f64> for ContextValue {
    fn from(x: f64) -> Self {
        ContextValue::Float(x)
    }
}

impl From<Vec<ContextValue>> for ContextValue {
    fn from(items: Vec<ContextValue>) -> Self {
        ContextValue::List(items)
    }
}

impl From<ContextMap> for ContextValue {
    fn from(map: ContextMap) -> Self {
        ContextValue::Map(map)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ContextValue::Null,
            Value::Bool(b) => ContextValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ContextValue::Integer(i),
                None => ContextValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ContextValue::Text(s),
            Value::Array(items) => {
                ContextValue::List(items.into_iter().map(ContextValue::from).collect())
            }
            Value::Object(map) => ContextValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, ContextValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ContextValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContextValue::Null => serializer.serialize_unit(),
            ContextValue::Bool(b) => serializer.serialize_bool(*b),
            ContextValue::Integer(i) => serializer.serialize_i64(*i),
            ContextValue::Float(x) => serializer.serialize_f64(*x),
            ContextValue::Text(s) => serializer.serialize_str(s),
            // Serialized text is always valid UTF-8.
            ContextValue::Bytes(b) => serializer.serialize_str(&crate::repair_utf8(b)),
            ContextValue::List(items) => items.serialize(serializer),
            ContextValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContextValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(ContextValue::from)
    }
}
