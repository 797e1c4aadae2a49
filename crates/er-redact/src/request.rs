//! Request-like input for environment extraction.
//!
//! The sanitizer does not parse HTTP. Anything that can expose an
//! environment table, a remote address, a URL, and the three parameter
//! maps can be summarized via [`RequestLike`]. Environment values, the
//! address, and the URL are byte strings because servers hand them over
//! unvalidated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ContextMap;

/// Read-only view of an incoming request.
pub trait RequestLike {
    /// Raw value of an environment entry.
    fn env_value(&self, key: &str) -> Option<&[u8]>;

    /// Client address as reported by the server.
    fn remote_ip(&self) -> &[u8];

    /// Full request URL.
    fn url(&self) -> &[u8];

    /// Parameters extracted from the route.
    fn path_parameters(&self) -> &ContextMap;

    /// Parameters parsed from the query string.
    fn query_parameters(&self) -> &ContextMap;

    /// Parameters parsed from the request body.
    fn request_parameters(&self) -> &ContextMap;
}

/// Owned snapshot of a request, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    #[serde(default, with = "text_bytes_map")]
    pub env: BTreeMap<String, Vec<u8>>,

    #[serde(default, with = "text_bytes")]
    pub remote_ip: Vec<u8>,

    #[serde(default, with = "text_bytes")]
    pub url: Vec<u8>,

    #[serde(default)]
    pub path_parameters: ContextMap,

    #[serde(default)]
    pub query_parameters: ContextMap,

    #[serde(default)]
    pub request_parameters: ContextMap,
}

impl RequestSnapshot {
    /// Set an environment entry.
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.env.insert(key.into(), value.into());
    }
}

impl RequestLike for RequestSnapshot {
    fn env_value(&self, key: &str) -> Option<&[u8]> {
        self.env.get(key).map(Vec::as_slice)
    }

    fn remote_ip(&self) -> &[u8] {
        &self.remote_ip
    }

    fn url(&self) -> &[u8] {
        &self.url
    }

    fn path_parameters(&self) -> &ContextMap {
        &self.path_parameters
    }

    fn query_parameters(&self) -> &ContextMap {
        &self.query_parameters
    }

    fn request_parameters(&self) -> &ContextMap {
        &self.request_parameters
    }
}

/// Byte strings as JSON text (lossy on the way out).
mod text_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::repair_utf8(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}

mod text_bytes_map {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            out.serialize_entry(key, &crate::repair_utf8(value))?;
        }
        out.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|(k, v)| (k, v.into_bytes())).collect())
    }
}
