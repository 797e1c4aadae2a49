//! Error types for report handling.
//!
//! Sanitization itself never fails; these errors come from the
//! collaborators around it (storage, delivery, configuration).

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors raised by report collaborators.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The report store could not persist or read a report.
    #[error("store error: {0}")]
    Store(String),

    /// A notifier failed to deliver a message.
    #[error("delivery to {target} failed: {reason}")]
    Delivery { target: String, reason: String },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Redaction policy problem.
    #[error(transparent)]
    Redaction(#[from] er_redact::RedactionError),

    /// I/O error from a file-backed collaborator.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn store(message: impl Into<String>) -> Self {
        ReportError::Store(message.into())
    }
}
