//! Fuzz target for query string and URL redaction.
//!
//! Arbitrary text must never panic the pair scanner, and a value placed
//! under a sensitive key must never survive redaction.

#![no_main]

use er_redact::{redact_query_string, redact_url};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let _ = redact_query_string(input);
    let _ = redact_url(input);

    if input.is_empty() || input.contains(['&', '=', '#']) {
        return;
    }
    let qs = format!("page=1&password={}&sort=asc", input);
    let out = redact_query_string(&qs);
    assert_eq!(out, "page=1&password=[FILTERED]&sort=asc");
});
