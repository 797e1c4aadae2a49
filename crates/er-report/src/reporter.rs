//! Report construction, persistence, and notification.
//!
//! `ErrorReporter` ties the sanitizer to a store and a notifier. Raw data
//! handed to it is repaired and redacted before anything is stored,
//! logged, or sent.

use std::sync::Arc;

use er_redact::{ContextMap, ContextValue, Sanitizer};

use crate::logging::{event_names, truncate_for_log};
use crate::notify::{
    DeliveryAction, Notifier, OutboundMessage, PluginSettings, ERROR_REPORTING_SETTING,
};
use crate::{ErrorReport, ReportStore, ReportingConfig, Result};

/// Data key holding the display form of a logged error.
pub const EXCEPTION_MESSAGE_KEY: &str = "exception_message";

/// Longest message written by log-only delivery.
const LOGGED_MESSAGE_MAX_CHARS: usize = 500;

/// Outcome of `send_to_external`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A message was handed to the notifier.
    Sent { to: String },
    /// The setting asks for a log event only.
    Logged,
    /// No delivery is configured.
    Skipped,
}

/// Builds, stores, and forwards error reports.
#[derive(Clone)]
pub struct ErrorReporter {
    sanitizer: Sanitizer,
    store: Arc<dyn ReportStore>,
    notifier: Arc<dyn Notifier>,
    plugins: PluginSettings,
}

impl ErrorReporter {
    pub fn new(
        sanitizer: Sanitizer,
        store: Arc<dyn ReportStore>,
        notifier: Arc<dyn Notifier>,
        plugins: PluginSettings,
    ) -> Self {
        Self {
            sanitizer,
            store,
            notifier,
            plugins,
        }
    }

    /// Build a reporter from loaded configuration.
    pub fn from_config(
        config: &ReportingConfig,
        store: Arc<dyn ReportStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let sanitizer = Sanitizer::new(config.redaction_policy())?;
        Ok(Self::new(sanitizer, store, notifier, config.plugins.clone()))
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn store(&self) -> &dyn ReportStore {
        self.store.as_ref()
    }

    /// Record an error with arbitrary context data.
    ///
    /// Data values may contain invalid UTF-8; they are repaired rather than
    /// rejected. A failed notification is logged but does not fail the
    /// call; a failed save does.
    pub fn log_error(&self, category: Option<&str>, data: &ContextMap) -> Result<ErrorReport> {
        let mut report = ErrorReport::new();
        report.assign_data(&self.sanitizer, data);
        if let Some(category) = category {
            report.category = Some(category.to_string());
        }
        self.save_and_notify(report)
    }

    /// Record an error value.
    ///
    /// The category defaults to the error's type name and the backtrace
    /// lists its source chain. A `message` already present in `data` is
    /// kept; otherwise the error's display form is used. The display form
    /// is always stored under `exception_message`.
    pub fn log_exception<E>(
        &self,
        category: Option<&str>,
        error: &E,
        data: &ContextMap,
    ) -> Result<ErrorReport>
    where
        E: std::error::Error + 'static,
    {
        let mut data = data.clone();
        let text = error.to_string();
        data.entry("message".to_string())
            .or_insert_with(|| ContextValue::Text(text.clone()));
        data.insert(EXCEPTION_MESSAGE_KEY.to_string(), ContextValue::Text(text));
        if let Some(chain) = source_chain(error) {
            data.entry("backtrace".to_string())
                .or_insert(ContextValue::Text(chain));
        }

        let category = category.unwrap_or(std::any::type_name::<E>());
        self.log_error(Some(category), &data)
    }

    /// Save a prepared report and forward it.
    pub fn save_and_notify(&self, report: ErrorReport) -> Result<ErrorReport> {
        let saved = match self.store.save(report) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(
                    event = event_names::REPORT_SAVE_FAILED,
                    error = %e,
                    "failed to save error report"
                );
                return Err(e);
            }
        };
        tracing::info!(
            event = event_names::REPORT_SAVED,
            id = saved.id,
            category = saved.category.as_deref().unwrap_or(""),
            "error report saved"
        );

        if let Err(e) = self.send_to_external(&saved) {
            tracing::warn!(
                event = event_names::REPORT_NOTIFY_FAILED,
                id = saved.id,
                error = %e,
                "failed to deliver error report"
            );
        }
        Ok(saved)
    }

    /// Forward a report to the configured `error_reporting` target.
    ///
    /// No-op when the setting is absent or incomplete.
    pub fn send_to_external(&self, report: &ErrorReport) -> Result<Delivery> {
        let Some(setting) = self.plugins.get(ERROR_REPORTING_SETTING) else {
            tracing::debug!(
                event = event_names::REPORT_NOTIFY_SKIPPED,
                id = report.id,
                "no delivery configured"
            );
            return Ok(Delivery::Skipped);
        };

        match setting.action {
            Some(DeliveryAction::Email) => {
                let Some(to) = setting.email_target() else {
                    tracing::debug!(
                        event = event_names::REPORT_NOTIFY_SKIPPED,
                        id = report.id,
                        "email delivery has no address"
                    );
                    return Ok(Delivery::Skipped);
                };
                let message = OutboundMessage::for_report(to, report);
                self.notifier.deliver(&message)?;
                tracing::info!(
                    event = event_names::REPORT_NOTIFIED,
                    id = report.id,
                    to = %to,
                    "error report sent"
                );
                Ok(Delivery::Sent { to: to.to_string() })
            }
            Some(DeliveryAction::Log) => {
                tracing::warn!(
                    event = event_names::REPORT_NOTIFIED,
                    id = report.id,
                    category = report.category.as_deref().unwrap_or(""),
                    subject = report.subject.as_deref().unwrap_or(""),
                    report_message = %truncate_for_log(
                        report.message.as_deref().unwrap_or(""),
                        LOGGED_MESSAGE_MAX_CHARS
                    ),
                    "error report"
                );
                Ok(Delivery::Logged)
            }
            None => Ok(Delivery::Skipped),
        }
    }
}

/// `source()` chain of an error, one cause per line.
fn source_chain(error: &dyn std::error::Error) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        lines.push(format!("caused by: {}", cause));
        current = cause.source();
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}
