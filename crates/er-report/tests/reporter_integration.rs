//! Integration tests for ErrorReporter.
//!
//! These tests verify:
//! - Reports are delivered only when `error_reporting` is configured
//! - Malformed bytes never fail a report
//! - Request environments stored on reports stay filtered
//! - Categories are tracked across saves

use std::sync::Arc;

use er_redact::{extract_useful_env, ContextMap, ContextValue, RequestSnapshot, Sanitizer};
use er_report::{
    Delivery, ErrorReport, ErrorReporter, InMemoryReportStore, JsonlReportStore, Notifier,
    OutboundMessage, OutboxNotifier, PluginSetting, PluginSettings, ReportError, ReportStore,
    ReportingConfig, ERROR_REPORTING_SETTING,
};

struct Harness {
    reporter: ErrorReporter,
    store: Arc<InMemoryReportStore>,
    outbox: Arc<OutboxNotifier>,
}

fn harness(plugins: PluginSettings) -> Harness {
    let store = Arc::new(InMemoryReportStore::new());
    let outbox = Arc::new(OutboxNotifier::new());
    let reporter = ErrorReporter::new(
        Sanitizer::default(),
        store.clone(),
        outbox.clone(),
        plugins,
    );
    Harness {
        reporter,
        store,
        outbox,
    }
}

fn email_plugins(address: &str) -> PluginSettings {
    let mut plugins = PluginSettings::new();
    plugins.insert(ERROR_REPORTING_SETTING, PluginSetting::email(address));
    plugins
}

fn data(entries: &[(&str, ContextValue)]) -> ContextMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ============================================================================
// Delivery
// ============================================================================

#[test]
fn test_email_sent_when_configured() {
    let h = harness(email_plugins("nobody@nowhere.com"));
    let report = ErrorReport::new().with_subject("subject").with_message("test");

    let delivery = h.reporter.send_to_external(&report).unwrap();

    assert_eq!(
        delivery,
        Delivery::Sent {
            to: "nobody@nowhere.com".to_string()
        }
    );
    let message = h.outbox.last().unwrap();
    assert_eq!(message.to, "nobody@nowhere.com");
    assert_eq!(message.subject, "Error Report: subject");
}

#[test]
fn test_email_not_sent_when_unconfigured() {
    let h = harness(PluginSettings::new());
    let report = ErrorReport::new().with_subject("subject").with_message("test");

    assert_eq!(h.reporter.send_to_external(&report).unwrap(), Delivery::Skipped);
    assert!(h.outbox.sent().is_empty());
}

#[test]
fn test_log_error_notifies_once_per_report() {
    let h = harness(email_plugins("nobody@nowhere.com"));
    let report = h
        .reporter
        .log_error(None, &data(&[("message", "boom".into())]))
        .unwrap();

    let sent = h.outbox.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains(&format!("Report: {}", report.id.unwrap())));
    assert!(sent[0].body.contains("boom"));
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn deliver(&self, message: &OutboundMessage) -> er_report::Result<()> {
        Err(ReportError::Delivery {
            target: message.to.clone(),
            reason: "smtp down".to_string(),
        })
    }
}

#[test]
fn test_failed_delivery_still_saves_report() {
    let store = Arc::new(InMemoryReportStore::new());
    let reporter = ErrorReporter::new(
        Sanitizer::default(),
        store.clone(),
        Arc::new(FailingNotifier),
        email_plugins("nobody@nowhere.com"),
    );

    let report = reporter
        .log_error(Some("db"), &data(&[("message", "boom".into())]))
        .unwrap();

    assert_eq!(report.id, Some(1));
    assert_eq!(store.len().unwrap(), 1);
    assert!(matches!(
        reporter.send_to_external(&report),
        Err(ReportError::Delivery { .. })
    ));
}

#[test]
fn test_from_config_uses_plugins_and_policy() {
    let config: ReportingConfig = serde_json::from_str(
        r#"{
            "plugins": {"error_reporting": {"action": "email", "email": "ops@example.com"}},
            "redaction": {"sensitive_keys": ["session_id"]}
        }"#,
    )
    .unwrap();
    let store = Arc::new(InMemoryReportStore::new());
    let outbox = Arc::new(OutboxNotifier::new());
    let reporter = ErrorReporter::from_config(&config, store, outbox.clone()).unwrap();

    let report = reporter
        .log_error(None, &data(&[("session_id", "s1".into()), ("api_key", "k".into())]))
        .unwrap();

    assert_eq!(report.data["session_id"], "[FILTERED]");
    assert_eq!(report.data["api_key"], "k");
    assert_eq!(outbox.last().unwrap().to, "ops@example.com");
}

// ============================================================================
// Encoding Repair
// ============================================================================

#[test]
fn test_message_with_invalid_byte_is_logged() {
    let h = harness(PluginSettings::new());
    let report = h
        .reporter
        .log_error(
            None,
            &data(&[("message", ContextValue::Bytes(b"he\xffllo".to_vec()))]),
        )
        .unwrap();

    assert_eq!(report.message.as_deref(), Some("hello"));
    assert_eq!(
        h.store.last().unwrap().unwrap().message.as_deref(),
        Some("hello")
    );
}

#[test]
fn test_invalid_bytes_in_nested_data() {
    let h = harness(PluginSettings::new());
    let nested: ContextMap = data(&[("k", ContextValue::Bytes(b"v\xfe1".to_vec()))]);
    let report = h
        .reporter
        .log_error(
            None,
            &data(&[
                ("list", ContextValue::List(vec![ContextValue::Bytes(b"a\xffb".to_vec())])),
                ("map", ContextValue::Map(nested)),
            ]),
        )
        .unwrap();

    assert_eq!(report.data["list"], r#"["ab"]"#);
    assert_eq!(report.data["map"], r#"{"k" => "v1"}"#);
}

// ============================================================================
// Request Environments
// ============================================================================

fn sample_request() -> RequestSnapshot {
    let mut request = RequestSnapshot::default();
    request.set_env("QUERY_STRING", "access_token=abcdef&pseudonym[password]=zzz");
    request.set_env("HTTP_HOST", "www.instructure.example.com");
    request.url =
        b"https://www.instructure.example.com?access_token=abcdef&pseudonym[password]=zzz".to_vec();
    request
        .path_parameters
        .insert("api_key".to_string(), "1".into());
    request
        .query_parameters
        .insert("access_token".to_string(), "abcdef".into());
    request
}

#[test]
fn test_request_env_stays_filtered_on_report() {
    let h = harness(PluginSettings::new());
    let env = extract_useful_env(&sample_request());
    let context: ContextMap = env
        .into_iter()
        .map(|(k, v)| (k, ContextValue::Text(v)))
        .collect();

    let report = h.reporter.log_error(Some("request"), &context).unwrap();

    assert_eq!(
        report.data["QUERY_STRING"],
        "?access_token=[FILTERED]&pseudonym[password]=[FILTERED]"
    );
    assert_eq!(report.data["path_parameters"], r#"{"api_key" => "[FILTERED]"}"#);
    assert_eq!(
        report.data["query_parameters"],
        r#"{"access_token" => "[FILTERED]"}"#
    );
    for value in report.data.values() {
        assert!(!value.contains("abcdef"));
        assert!(!value.contains("zzz"));
    }
}

#[test]
fn test_request_is_not_mutated() {
    let request = sample_request();
    let before = request.clone();
    let first = extract_useful_env(&request);
    let second = extract_useful_env(&request);
    assert_eq!(request, before);
    assert_eq!(first, second);
}

#[test]
fn test_report_url_is_filtered() {
    let h = harness(PluginSettings::new());
    let report = h
        .reporter
        .log_error(
            None,
            &data(&[(
                "url",
                "https://www.instructure.example.com?access_token=abcdef".into(),
            )]),
        )
        .unwrap();
    assert_eq!(
        report.url(),
        Some("https://www.instructure.example.com?access_token=[FILTERED]")
    );
}

// ============================================================================
// Categories
// ============================================================================

#[test]
fn test_categories_track_saved_reports() {
    let h = harness(PluginSettings::new());
    assert!(h.store.categories().unwrap().is_empty());

    h.reporter.log_error(Some("bob"), &ContextMap::new()).unwrap();
    assert_eq!(h.store.categories().unwrap(), vec!["bob"]);
    h.reporter.log_error(Some("bob"), &ContextMap::new()).unwrap();
    assert_eq!(h.store.categories().unwrap(), vec!["bob"]);
    h.reporter.log_error(Some("george"), &ContextMap::new()).unwrap();
    assert_eq!(h.store.categories().unwrap(), vec!["bob", "george"]);
    h.reporter.log_error(Some("fred"), &ContextMap::new()).unwrap();
    assert_eq!(h.store.categories().unwrap(), vec!["bob", "fred", "george"]);
}

#[test]
fn test_categories_survive_jsonl_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.jsonl");

    {
        let store = Arc::new(JsonlReportStore::open(&path).unwrap());
        let reporter = ErrorReporter::new(
            Sanitizer::default(),
            store,
            Arc::new(OutboxNotifier::new()),
            PluginSettings::new(),
        );
        for category in ["bob", "bob", "george", "fred"] {
            reporter.log_error(Some(category), &ContextMap::new()).unwrap();
        }
    }

    let store = JsonlReportStore::open(&path).unwrap();
    assert_eq!(store.categories().unwrap(), vec!["bob", "fred", "george"]);
    assert_eq!(store.len().unwrap(), 4);
}
