//! Fuzz target for redaction policy parsing.
//!
//! Tests that JSON policy parsing and validation handle arbitrary input
//! without panicking.

#![no_main]

use er_redact::{RedactionPolicy, Sanitizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Should never panic, only return an error
    if let Ok(policy) = serde_json::from_slice::<RedactionPolicy>(data) {
        let _ = Sanitizer::new(policy);
    }
});
