//! Error types for the sanitizer.
//!
//! Sanitizing data never fails. These errors only come from loading,
//! saving, or validating a redaction policy.

use thiserror::Error;

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while handling a redaction policy.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// The policy is structurally valid JSON but semantically unusable.
    #[error("policy error: {0}")]
    PolicyError(String),

    /// I/O error during policy file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RedactionError {
    pub(crate) fn policy(message: impl Into<String>) -> Self {
        RedactionError::PolicyError(message.into())
    }
}
