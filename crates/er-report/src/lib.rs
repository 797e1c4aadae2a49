//! Error reports built from sanitized context.
//!
//! Sits on top of `er-redact`: every value a caller hands in is repaired
//! and redacted before it reaches a [`ReportStore`], a log line, or a
//! [`Notifier`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use er_redact::{ContextMap, Sanitizer};
//! use er_report::{
//!     ErrorReporter, InMemoryReportStore, OutboxNotifier, PluginSettings, ReportStore,
//! };
//!
//! let store = Arc::new(InMemoryReportStore::new());
//! let reporter = ErrorReporter::new(
//!     Sanitizer::default(),
//!     store.clone(),
//!     Arc::new(OutboxNotifier::new()),
//!     PluginSettings::new(),
//! );
//!
//! let mut data = ContextMap::new();
//! data.insert("message".into(), "boom".into());
//! data.insert("api_key".into(), "secret".into());
//!
//! let report = reporter.log_error(Some("db"), &data).unwrap();
//! assert_eq!(report.data["api_key"], "[FILTERED]");
//! assert_eq!(store.categories().unwrap(), vec!["db"]);
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod notify;
pub mod report;
pub mod reporter;
pub mod store;

pub use config::{
    load_config, load_config_file, ConfigError, ConfigOptions, ReportingConfig, ResolvedConfig,
};
pub use error::{ReportError, Result};
pub use exit_codes::ExitCode;
pub use notify::{
    DeliveryAction, LogNotifier, Notifier, OutboundMessage, OutboxNotifier, PluginSetting,
    PluginSettings, ERROR_REPORTING_SETTING,
};
pub use report::{ErrorReport, ReportId};
pub use reporter::{Delivery, ErrorReporter, EXCEPTION_MESSAGE_KEY};
pub use store::{InMemoryReportStore, JsonlReportStore, ReportStore};
