//! Integration tests for er-redact.
//!
//! These tests verify:
//! - Sensitive values never leak through any redaction path
//! - Report URLs only lose their access token
//! - Request environments are fully filtered and valid UTF-8
//! - Policies loaded from disk drive the sanitizer

use er_redact::{
    extract_useful_env, redact_mapping, redact_query_string, redact_url, sanitize_bytes,
    ContextMap, ContextValue, RedactionPolicy, RequestSnapshot, Sanitizer, FILTERED_MARKER,
};

/// Secret values that must NEVER appear in any output.
const CANARY_SECRETS: &[&str] = &[
    "abcdef",
    "zzz-canary-password",
    "xoxo-client-secret",
    "sk-canary-api-key-1234567890",
];

const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "auth_password",
    "access_token",
    "api_key",
    "client_secret",
    "fb_sig_friends",
    "pseudonym[password]",
    "user[api_key]",
    "password[]",
    "api_key[]",
];

fn text_map(entries: &[(&str, &str)]) -> ContextMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), ContextValue::from(*v)))
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_query_string_scenario() {
    assert_eq!(
        redact_query_string("access_token=abcdef&pseudonym[password]=zzz"),
        "access_token=[FILTERED]&pseudonym[password]=[FILTERED]"
    );
}

#[test]
fn test_url_scenario() {
    assert_eq!(
        redact_url("https://example.com?access_token=abcdef"),
        "https://example.com?access_token=[FILTERED]"
    );
    assert_eq!(
        redact_url("https://www.instructure.example.com?access_token=abcdef"),
        "https://www.instructure.example.com?access_token=[FILTERED]"
    );
}

#[test]
fn test_path_parameter_scenario() {
    let out = redact_mapping(&text_map(&[("api_key", "1")]));
    assert_eq!(out.len(), 1);
    assert_eq!(out["api_key"], FILTERED_MARKER);
}

#[test]
fn test_request_scenario() {
    let mut request = RequestSnapshot::default();
    request.set_env("QUERY_STRING", "access_token=abcdef&pseudonym[password]=zzz");
    request.set_env(
        "REQUEST_URI",
        "https://www.instructure.example.com?access_token=abcdef&pseudonym[password]=zzz",
    );
    request.url = request.env["REQUEST_URI"].clone();
    request.path_parameters = text_map(&[("api_key", "1")]);
    request.query_parameters =
        text_map(&[("access_token", "abcdef"), ("pseudonym[password]", "zzz")]);
    request.request_parameters = text_map(&[("client_secret", "xoxo")]);

    let data = extract_useful_env(&request);

    assert_eq!(
        data["QUERY_STRING"],
        "?access_token=[FILTERED]&pseudonym[password]=[FILTERED]"
    );
    assert_eq!(
        data["REQUEST_URI"],
        "https://www.instructure.example.com?access_token=[FILTERED]&pseudonym[password]=[FILTERED]"
    );
    assert_eq!(data["path_parameters"], r#"{"api_key" => "[FILTERED]"}"#);
    assert_eq!(
        data["query_parameters"],
        r#"{"access_token" => "[FILTERED]", "pseudonym[password]" => "[FILTERED]"}"#
    );
    assert_eq!(data["request_parameters"], r#"{"client_secret" => "[FILTERED]"}"#);
}

// ============================================================================
// Canary Leak Tests
// ============================================================================

#[test]
fn test_canaries_never_leak_from_query_strings() {
    for key in SENSITIVE_KEYS {
        for canary in CANARY_SECRETS {
            let qs = format!("page=1&{}={}&sort=asc", key, canary);
            let out = redact_query_string(&qs);
            assert!(
                !out.contains(canary),
                "Canary '{}' under '{}' leaked: {}",
                canary,
                key,
                out
            );
            assert!(out.starts_with("page=1&"));
            assert!(out.ends_with("&sort=asc"));
        }
    }
}

#[test]
fn test_canaries_never_leak_from_mappings() {
    for key in SENSITIVE_KEYS {
        for canary in CANARY_SECRETS {
            let out = redact_mapping(&text_map(&[(*key, *canary), ("other", "ok")]));
            assert_eq!(out[*key], FILTERED_MARKER);
            assert_eq!(out["other"], "ok");
        }
    }
}

#[test]
fn test_canaries_never_leak_from_request() {
    for canary in CANARY_SECRETS {
        let mut request = RequestSnapshot::default();
        request.set_env("QUERY_STRING", format!("api_key={canary}"));
        request.set_env("HTTP_REFERER", format!("https://r.example/?access_token={canary}"));
        request.url = format!("https://x.example/p?client_secret={canary}").into_bytes();
        request.path_parameters = text_map(&[("password", *canary)]);
        request.query_parameters = text_map(&[("api_key", *canary)]);
        request.request_parameters = text_map(&[("pseudonym[password]", *canary)]);

        let data = extract_useful_env(&request);
        for (key, value) in &data {
            assert!(
                !value.contains(canary),
                "Canary '{}' leaked in {}: {}",
                canary,
                key,
                value
            );
        }
    }
}

// ============================================================================
// Encoding Repair
// ============================================================================

#[test]
fn test_request_with_invalid_bytes_is_repaired() {
    let mut request = RequestSnapshot::default();
    request.set_env("QUERY_STRING", &b"somestuff=bl\xffah"[..]);
    request.set_env("HTTP_HOST", &b"some\xfehost.com"[..]);
    request.remote_ip = b"10.0.0.\xff1".to_vec();
    request
        .query_parameters
        .insert("q".to_string(), ContextValue::Bytes(b"caf\xe9".to_vec()));

    let snapshot = request.clone();
    let data = extract_useful_env(&request);

    assert_eq!(data["QUERY_STRING"], "?somestuff=blah");
    assert_eq!(data["HTTP_HOST"], "somehost.com");
    assert_eq!(data["REMOTE_ADDR"], "10.0.0.1");
    assert_eq!(data["query_parameters"], r#"{"q" => "caf"}"#);
    // The request itself is untouched.
    assert_eq!(request, snapshot);

    // Repairing the already-clean output is a no-op.
    for value in data.values() {
        let v = ContextValue::Text(value.clone());
        assert_eq!(sanitize_bytes(&v, true), v);
    }
}

#[test]
fn test_message_with_invalid_byte() {
    let v = ContextValue::Bytes(b"he\xffllo".to_vec());
    assert_eq!(sanitize_bytes(&v, false), ContextValue::Text("hello".to_string()));
}

// ============================================================================
// Policy Files
// ============================================================================

#[test]
fn test_policy_file_overrides_key_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redaction.json");
    std::fs::write(
        &path,
        r#"{"schema_version": "1.0.0", "sensitive_keys": ["session_id"], "url_keys": ["session_id"]}"#,
    )
    .unwrap();

    let policy = RedactionPolicy::load(&path).unwrap();
    let sanitizer = Sanitizer::new(policy).unwrap();

    assert_eq!(
        sanitizer.redact_query_string("session_id=1&password=2"),
        "session_id=[FILTERED]&password=2"
    );
    assert_eq!(
        sanitizer.redact_url("https://e.example/?session_id=9&access_token=t"),
        "https://e.example/?session_id=[FILTERED]&access_token=t"
    );
    // Composite defaults survive a partial policy file.
    assert!(sanitizer.is_sensitive("pseudonym[password]"));
}

#[test]
fn test_policy_file_with_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redaction.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(RedactionPolicy::load(&path).is_err());
}
