//! Exit codes for the er-report CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors

use crate::{ConfigError, ReportError};

/// Exit codes for er-report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed.
    Ok = 0,

    /// Invalid arguments or unreadable input payload.
    ArgsError = 10,

    /// Configuration missing, malformed, or of the wrong version.
    ConfigError = 11,

    /// Report store unreadable or corrupt.
    StoreError = 12,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as u8))
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::StoreError => "ERR_STORE",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Classify a report error.
    pub fn for_error(error: &ReportError) -> Self {
        match error {
            ReportError::Config(ConfigError::IoError { .. }) => ExitCode::IoError,
            ReportError::Config(_) | ReportError::Redaction(_) => ExitCode::ConfigError,
            ReportError::Store(_) => ExitCode::StoreError,
            ReportError::Json(_) => ExitCode::ArgsError,
            ReportError::Io(_) => ExitCode::IoError,
            ReportError::Delivery { .. } => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_u8())
    }
}
