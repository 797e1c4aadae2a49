//! Encoding repair.
//!
//! Strips invalid UTF-8 sequences while keeping every valid character.
//! Input is only ever borrowed: repaired values are built fresh, so data
//! shared with the caller (or frozen by them) is never touched.

use std::borrow::Cow;

use crate::{ContextMap, ContextValue};

/// Repair a byte string into valid UTF-8 by dropping invalid sequences.
///
/// Valid input is borrowed without copying.
pub fn repair_utf8(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let mut out = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            Cow::Owned(out)
        }
    }
}

/// Return a repaired copy of `value`.
///
/// Strings become valid `Text`. With `deep`, lists and maps are rebuilt
/// with every contained string repaired; without it containers are
/// copied unchanged. Never fails and is idempotent.
pub fn sanitize_bytes(value: &ContextValue, deep: bool) -> ContextValue {
    match value {
        ContextValue::Bytes(bytes) => ContextValue::Text(repair_utf8(bytes).into_owned()),
        ContextValue::List(items) if deep => ContextValue::List(
            items
                .iter()
                .map(|item| sanitize_bytes(item, true))
                .collect(),
        ),
        ContextValue::Map(map) if deep => ContextValue::Map(sanitize_map(map)),
        other => other.clone(),
    }
}

/// Deep-repair every value of a map.
pub fn sanitize_map(map: &ContextMap) -> ContextMap {
    map.iter()
        .map(|(key, value)| (key.clone(), sanitize_bytes(value, true)))
        .collect()
}
