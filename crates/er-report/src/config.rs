//! Reporting configuration.
//!
//! Resolution order (highest to lowest priority):
//! 1. Explicit path (CLI `--config`)
//! 2. Environment variable `ERROR_REPORT_CONFIG`
//! 3. `$XDG_CONFIG_HOME/error_report/config.json`
//! 4. Built-in defaults

use er_redact::RedactionPolicy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::notify::PluginSettings;

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "ERROR_REPORT_CONFIG";

/// Default XDG config directory name.
const CONFIG_DIR_NAME: &str = "error_report";

const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Invalid redaction policy in {path}: {source}")]
    PolicyError {
        path: PathBuf,
        #[source]
        source: er_redact::RedactionError,
    },
}

/// Reporting configuration file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Plugin settings by name (e.g. `error_reporting`).
    #[serde(default)]
    pub plugins: PluginSettings,

    /// Redaction policy override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redaction: Option<RedactionPolicy>,
}

fn default_schema_version() -> String {
    CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            plugins: PluginSettings::default(),
            redaction: None,
        }
    }
}

impl ReportingConfig {
    /// The effective redaction policy.
    pub fn redaction_policy(&self) -> RedactionPolicy {
        self.redaction.clone().unwrap_or_default()
    }
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config file (highest priority). Must exist.
    pub config_path: Option<PathBuf>,
    /// Explicit config directory, replacing the XDG lookup.
    pub config_dir: Option<PathBuf>,
}

/// Loaded configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ReportingConfig,
    /// File the config came from (None if using defaults).
    pub path: Option<PathBuf>,
    /// SHA-256 of the file content (None if using defaults).
    pub hash: Option<String>,
}

/// Load configuration with the standard resolution order.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        return load_config_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        return load_config_file(&path);
    }

    let default_path = resolve_config_dir(options).join(CONFIG_FILE_NAME);
    if default_path.exists() {
        return load_config_file(&default_path);
    }

    Ok(ResolvedConfig {
        config: ReportingConfig::default(),
        path: None,
        hash: None,
    })
}

fn resolve_config_dir(options: &ConfigOptions) -> PathBuf {
    if let Some(dir) = &options.config_dir {
        return dir.clone();
    }

    let xdg_config = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });

    xdg_config.join(CONFIG_DIR_NAME)
}

/// Load and validate a specific config file.
pub fn load_config_file(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: ReportingConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(ConfigError::VersionMismatch {
            expected: CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if let Some(policy) = &config.redaction {
        policy.validate().map_err(|e| ConfigError::PolicyError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(ResolvedConfig {
        config,
        path: Some(path.to_path_buf()),
        hash: Some(compute_hash(&content)),
    })
}

/// SHA-256 of content, hex encoded.
fn compute_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
