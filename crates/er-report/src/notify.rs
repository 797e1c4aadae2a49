//! External notification of saved reports.
//!
//! Delivery targets come from plugin settings keyed by name (the reporter
//! uses `error_reporting`). The [`Notifier`] trait is the seam to a real
//! mailer; the backends here record or log messages instead of sending.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{ErrorReport, ReportError, Result};

/// Plugin setting name consulted for report delivery.
pub const ERROR_REPORTING_SETTING: &str = "error_reporting";

/// How a plugin wants reports delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryAction {
    /// Send a message to the configured address.
    Email,
    /// Emit a log event only.
    Log,
}

/// Settings of a single plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DeliveryAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PluginSetting {
    /// Setting that emails reports to `address`.
    pub fn email(address: impl Into<String>) -> Self {
        Self {
            action: Some(DeliveryAction::Email),
            email: Some(address.into()),
        }
    }

    /// The delivery address, when the setting asks for email and has one.
    pub fn email_target(&self) -> Option<&str> {
        match (self.action, self.email.as_deref()) {
            (Some(DeliveryAction::Email), Some(address)) if !address.trim().is_empty() => {
                Some(address)
            }
            _ => None,
        }
    }
}

/// Process-wide plugin settings, keyed by setting name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginSettings(BTreeMap<String, PluginSetting>);

impl PluginSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PluginSetting> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, setting: PluginSetting) {
        self.0.insert(name.into(), setting);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundMessage {
    /// Compose the notification for a saved report.
    pub fn for_report(to: impl Into<String>, report: &ErrorReport) -> Self {
        let subject = format!(
            "Error Report: {}",
            report.subject.as_deref().unwrap_or("(no subject)")
        );

        let mut body = String::new();
        let id = report
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unsaved".to_string());
        body.push_str(&format!("Report: {}\n", id));
        body.push_str(&format!("Created: {}\n", report.created_at.to_rfc3339()));
        if let Some(category) = &report.category {
            body.push_str(&format!("Category: {}\n", category));
        }
        if let Some(account_id) = report.account_id {
            body.push_str(&format!("Account: {}\n", account_id));
        }
        if let Some(url) = report.url() {
            body.push_str(&format!("URL: {}\n", url));
        }
        if let Some(message) = &report.message {
            body.push_str(&format!("\n{}\n", message));
        }
        if let Some(backtrace) = &report.backtrace {
            body.push_str(&format!("\n{}\n", backtrace));
        }
        if !report.data.is_empty() {
            body.push('\n');
            for (key, value) in &report.data {
                body.push_str(&format!("{}: {}\n", key, value));
            }
        }

        Self {
            to: to.into(),
            subject,
            body,
        }
    }
}

/// Delivery collaborator.
pub trait Notifier: Send + Sync {
    fn deliver(&self, message: &OutboundMessage) -> Result<()>;
}

/// Keeps delivered messages in memory.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<OutboundMessage> {
        self.sent().pop()
    }
}

impl Notifier for OutboxNotifier {
    fn deliver(&self, message: &OutboundMessage) -> Result<()> {
        let mut sent = self.sent.lock().map_err(|_| ReportError::Delivery {
            target: message.to.clone(),
            reason: "outbox lock poisoned".to_string(),
        })?;
        sent.push(message.clone());
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, message: &OutboundMessage) -> Result<()> {
        tracing::info!(
            target: "er_report::notify",
            to = %message.to,
            subject = %message.subject,
            "report notification"
        );
        Ok(())
    }
}
