//! Main sanitizer.
//!
//! The `Sanitizer` compiles a [`RedactionPolicy`] into key sets once and
//! then applies redaction to URLs, query strings, parameter maps, and
//! request environments. It holds no mutable state and is safe to share
//! across threads.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::query::{redact_query, redact_uri};
use crate::{
    repair_utf8, sanitize_map, ContextMap, ContextValue, RedactionPolicy, RequestLike, Result,
    SensitiveKeySet,
};

/// Sanitized output: every value is a displayable string.
pub type SanitizedContext = BTreeMap<String, String>;

static DEFAULT_SANITIZER: Lazy<Sanitizer> =
    Lazy::new(|| Sanitizer::with_policy(RedactionPolicy::default()));

/// Process-wide sanitizer built from the default policy.
pub fn default_sanitizer() -> &'static Sanitizer {
    &DEFAULT_SANITIZER
}

/// Redact `access_token` values in a URL with the default policy.
pub fn redact_url(url: &str) -> String {
    default_sanitizer().redact_url(url)
}

/// Redact a query string with the default policy.
pub fn redact_query_string(qs: &str) -> String {
    default_sanitizer().redact_query_string(qs)
}

/// Redact a parameter map with the default policy.
pub fn redact_mapping(input: &ContextMap) -> SanitizedContext {
    default_sanitizer().redact_mapping(input)
}

/// Extract the useful parts of a request with the default policy.
pub fn extract_useful_env<R: RequestLike + ?Sized>(request: &R) -> SanitizedContext {
    default_sanitizer().extract_useful_env(request)
}

/// Applies a redaction policy to error context data.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    /// The redaction policy.
    policy: RedactionPolicy,

    /// Keys redacted in maps, query strings, and request URIs.
    sensitive: SensitiveKeySet,

    /// Keys redacted from report URLs.
    url_keys: SensitiveKeySet,
}

impl Sanitizer {
    /// Create a sanitizer after validating the policy.
    pub fn new(policy: RedactionPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self::with_policy(policy))
    }

    fn with_policy(policy: RedactionPolicy) -> Self {
        let sensitive = SensitiveKeySet::new(
            policy.sensitive_keys.iter().cloned(),
            policy.composite_keys.iter().cloned(),
        );
        let url_keys = SensitiveKeySet::from_names(policy.url_keys.iter().cloned());
        Self {
            policy,
            sensitive,
            url_keys,
        }
    }

    /// Get a reference to the policy.
    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// The redaction marker.
    pub fn marker(&self) -> &str {
        &self.policy.marker
    }

    /// Returns whether values under `key` are redacted.
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.sensitive.contains(key)
    }

    /// Redact the URL keys (by default `access_token`) in a URL's query.
    ///
    /// Everything outside the redacted values is returned verbatim. URLs
    /// without a query, or without a matching parameter, are unchanged.
    pub fn redact_url(&self, url: &str) -> String {
        redact_uri(url, &self.url_keys, &self.policy.marker)
    }

    /// Redact every sensitive parameter in a URL's query.
    pub fn redact_request_uri(&self, url: &str) -> String {
        redact_uri(url, &self.sensitive, &self.policy.marker)
    }

    /// Redact sensitive pairs in a `k=v&k=v` query string.
    pub fn redact_query_string(&self, qs: &str) -> String {
        redact_query(qs, &self.sensitive, &self.policy.marker)
    }

    /// Replace sensitive values in a parameter map with the marker.
    ///
    /// Only top-level keys are checked unless the policy sets
    /// `redact_nested`.
    pub fn filter_params(&self, params: &ContextMap) -> ContextMap {
        params
            .iter()
            .map(|(key, value)| {
                let filtered = if self.is_sensitive(key) {
                    ContextValue::Text(self.policy.marker.clone())
                } else if self.policy.redact_nested {
                    self.filter_nested(value)
                } else {
                    value.clone()
                };
                (key.clone(), filtered)
            })
            .collect()
    }

    /// Filter maps found inside a value, including maps held in lists.
    fn filter_nested(&self, value: &ContextValue) -> ContextValue {
        match value {
            ContextValue::Map(nested) => ContextValue::Map(self.filter_params(nested)),
            ContextValue::List(items) => {
                ContextValue::List(items.iter().map(|item| self.filter_nested(item)).collect())
            }
            other => other.clone(),
        }
    }

    /// Redact a map and coerce every value to its display string.
    pub fn redact_mapping(&self, input: &ContextMap) -> SanitizedContext {
        self.filter_params(input)
            .into_iter()
            .map(|(key, value)| (key, value.display_string()))
            .collect()
    }

    /// Build the storable environment summary for a request.
    ///
    /// Copies the policy's useful environment keys, the remote address,
    /// the redacted query string and request URI, and display forms of
    /// the path, query, and body parameter maps. The request is only
    /// borrowed and invalid bytes are stripped from every value.
    pub fn extract_useful_env<R: RequestLike + ?Sized>(&self, request: &R) -> SanitizedContext {
        let mut env = SanitizedContext::new();
        for key in &self.policy.useful_env_keys {
            if let Some(raw) = request.env_value(key) {
                env.insert(key.clone(), repair_utf8(raw).into_owned());
            }
        }

        env.insert(
            "REMOTE_ADDR".to_string(),
            repair_utf8(request.remote_ip()).into_owned(),
        );

        let query_string = match env.get("QUERY_STRING") {
            Some(qs) => match qs.strip_prefix('?').unwrap_or(qs.as_str()) {
                "" => String::new(),
                bare => self.redact_query_string(&format!("?{}", bare)),
            },
            None => String::new(),
        };
        env.insert("QUERY_STRING".to_string(), query_string);

        let url = repair_utf8(request.url());
        env.insert("REQUEST_URI".to_string(), self.redact_request_uri(&url));

        let params = [
            ("path_parameters", request.path_parameters()),
            ("query_parameters", request.query_parameters()),
            ("request_parameters", request.request_parameters()),
        ];
        for (name, map) in params {
            let filtered = self.filter_params(&sanitize_map(map));
            env.insert(name.to_string(), ContextValue::Map(filtered).to_string());
        }

        // Useful env values can themselves carry sensitive keys.
        for key in ["HTTP_REFERER", "PATH_INFO", "REQUEST_PATH"] {
            if let Some(value) = env.get_mut(key) {
                *value = self.redact_request_uri(value);
            }
        }

        env
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        default_sanitizer().clone()
    }
}
