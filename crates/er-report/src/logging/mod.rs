//! Structured logging.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for automation
//!
//! stdout is reserved for command payloads; all log output goes to stderr.
//! Only sanitized report data is ever passed to log macros.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Event names used as `event` fields on report log records.
pub mod event_names {
    pub const REPORT_SAVED: &str = "report.saved";
    pub const REPORT_SAVE_FAILED: &str = "report.save_failed";
    pub const REPORT_NOTIFIED: &str = "report.notified";
    pub const REPORT_NOTIFY_SKIPPED: &str = "report.notify_skipped";
    pub const REPORT_NOTIFY_FAILED: &str = "report.notify_failed";
    pub const CONFIG_LOADED: &str = "config.loaded";
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup. `RUST_LOG` directives take priority
/// over the configured level. Returns false if a global subscriber was
/// already installed.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .from_env_lossy();

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
                    .is_ok()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
                    .is_ok()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
                .is_ok()
        }
    }
}

/// Shorten a string for inclusion in a log line.
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...(truncated)", &s[..cut]),
        None => s.to_string(),
    }
}
