//! The error report record.
//!
//! A report is built from already-sanitized data. The only mutation paths
//! are `set_url`, which scrubs the access token on assignment, and
//! `assign_data`, which repairs and redacts a raw context map before
//! storing it.

use chrono::{DateTime, Utc};
use er_redact::{sanitize_map, ContextMap, SanitizedContext, Sanitizer};
use serde::{Deserialize, Serialize};

/// Identifier assigned by a report store.
pub type ReportId = u64;

/// Data keys copied onto report fields by `assign_data`.
const FIELD_KEYS: &[&str] = &["category", "subject", "message", "url", "backtrace"];

/// A stored error report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Set by the store on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReportId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,

    /// Always stored redacted; see [`ErrorReport::set_url`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,

    /// Sanitized context data.
    #[serde(default)]
    pub data: SanitizedContext,

    pub created_at: DateTime<Utc>,
}

impl ErrorReport {
    /// Create an empty, unsaved report.
    pub fn new() -> Self {
        Self {
            id: None,
            category: None,
            subject: None,
            message: None,
            account_id: None,
            url: None,
            backtrace: None,
            data: SanitizedContext::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_account(mut self, account_id: u64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// The stored (redacted) URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Assign the report URL, redacting its access token.
    pub fn set_url(&mut self, sanitizer: &Sanitizer, url: &str) {
        self.url = Some(sanitizer.redact_url(url));
    }

    /// Replace the report data with a repaired, redacted copy of `data`.
    ///
    /// Keys that name report fields (`category`, `subject`, `message`,
    /// `url`, `backtrace`) are also copied onto those fields.
    pub fn assign_data(&mut self, sanitizer: &Sanitizer, data: &ContextMap) {
        let mut clean = sanitizer.redact_mapping(&sanitize_map(data));
        if let Some(url) = clean.get_mut("url") {
            *url = sanitizer.redact_url(url);
        }

        for key in FIELD_KEYS {
            let Some(value) = clean.get(*key) else {
                continue;
            };
            match *key {
                "category" => self.category = Some(value.clone()),
                "subject" => self.subject = Some(value.clone()),
                "message" => self.message = Some(value.clone()),
                "url" => self.url = Some(value.clone()),
                "backtrace" => self.backtrace = Some(value.clone()),
                _ => {}
            }
        }

        self.data = clean;
    }
}

impl Default for ErrorReport {
    fn default() -> Self {
        Self::new()
    }
}
