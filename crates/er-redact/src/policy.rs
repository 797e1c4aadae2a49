//! Redaction policy configuration.
//!
//! Defines which keys are sensitive, which query parameters are scrubbed
//! from report URLs, and which environment entries are worth keeping.
//! The marker and default key lists are part of the stored-report format
//! and must stay stable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{RedactionError, Result};

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// Literal text substituted for sensitive values.
pub const FILTERED_MARKER: &str = "[FILTERED]";

/// Key names whose values are never stored in cleartext.
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "auth_password",
    "access_token",
    "api_key",
    "client_secret",
    "fb_sig_friends",
];

/// Composite form keys matched verbatim in addition to segment matching.
pub const DEFAULT_COMPOSITE_KEYS: &[&str] = &["pseudonym[password]"];

/// Query parameters scrubbed from a report's URL on assignment.
pub const DEFAULT_URL_KEYS: &[&str] = &["access_token"];

/// Environment entries copied into a report.
pub const DEFAULT_USEFUL_ENV_KEYS: &[&str] = &[
    "HTTP_ACCEPT",
    "HTTP_ACCEPT_ENCODING",
    "HTTP_HOST",
    "HTTP_REFERER",
    "HTTP_USER_AGENT",
    "PATH_INFO",
    "QUERY_STRING",
    "REQUEST_METHOD",
    "REQUEST_PATH",
    "REQUEST_URI",
    "SERVER_NAME",
    "SERVER_PORT",
    "SERVER_PROTOCOL",
];

/// Redaction policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Replacement text for sensitive values.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Sensitive key names (case-sensitive).
    #[serde(default = "default_sensitive_keys")]
    pub sensitive_keys: Vec<String>,

    /// Composite keys matched as whole names.
    #[serde(default = "default_composite_keys")]
    pub composite_keys: Vec<String>,

    /// Query parameters redacted by `redact_url`.
    #[serde(default = "default_url_keys")]
    pub url_keys: Vec<String>,

    /// Environment keys kept by `extract_useful_env`.
    #[serde(default = "default_useful_env_keys")]
    pub useful_env_keys: Vec<String>,

    /// Also redact sensitive keys inside nested maps.
    #[serde(default)]
    pub redact_nested: bool,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

fn default_marker() -> String {
    FILTERED_MARKER.to_string()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_sensitive_keys() -> Vec<String> {
    to_owned_list(DEFAULT_SENSITIVE_KEYS)
}

fn default_composite_keys() -> Vec<String> {
    to_owned_list(DEFAULT_COMPOSITE_KEYS)
}

fn default_url_keys() -> Vec<String> {
    to_owned_list(DEFAULT_URL_KEYS)
}

fn default_useful_env_keys() -> Vec<String> {
    to_owned_list(DEFAULT_USEFUL_ENV_KEYS)
}

impl RedactionPolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load policy from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: RedactionPolicy = serde_json::from_str(&content)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Save policy to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add a sensitive key name, ignoring duplicates.
    pub fn add_sensitive_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.sensitive_keys.contains(&key) {
            self.sensitive_keys.push(key);
        }
    }

    /// Check that the policy can be compiled into a sanitizer.
    ///
    /// Key names must be non-empty and must not contain the query
    /// separators `&` or `=`, otherwise they could never match a pair.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != POLICY_SCHEMA_VERSION {
            return Err(RedactionError::policy(format!(
                "unsupported schema version {} (expected {})",
                self.schema_version, POLICY_SCHEMA_VERSION
            )));
        }
        if self.marker.is_empty() {
            return Err(RedactionError::policy("marker must not be empty"));
        }

        let lists = [
            ("sensitive_keys", &self.sensitive_keys),
            ("composite_keys", &self.composite_keys),
            ("url_keys", &self.url_keys),
        ];
        for (name, keys) in lists {
            for key in keys {
                if key.is_empty() {
                    return Err(RedactionError::policy(format!("{name}: empty key")));
                }
                if key.contains(['&', '=']) {
                    return Err(RedactionError::policy(format!(
                        "{name}: key {key:?} contains a query separator"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            marker: default_marker(),
            sensitive_keys: default_sensitive_keys(),
            composite_keys: default_composite_keys(),
            url_keys: default_url_keys(),
            useful_env_keys: default_useful_env_keys(),
            redact_nested: false,
        }
    }
}
