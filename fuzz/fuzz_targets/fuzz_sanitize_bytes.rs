//! Fuzz target for encoding repair.
//!
//! Repair must never panic, must always yield valid UTF-8, and must be a
//! no-op on its own output.

#![no_main]

use er_redact::{repair_utf8, sanitize_bytes, ContextValue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let repaired = repair_utf8(data);
    assert_eq!(repair_utf8(repaired.as_bytes()), repaired);

    let nested = ContextValue::List(vec![
        ContextValue::Bytes(data.to_vec()),
        ContextValue::Text(repaired.to_string()),
    ]);
    let once = sanitize_bytes(&nested, true);
    assert_eq!(sanitize_bytes(&once, true), once);
});
