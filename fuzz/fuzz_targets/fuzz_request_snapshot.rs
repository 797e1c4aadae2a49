//! Fuzz target for request snapshot loading and environment extraction.

#![no_main]

use er_redact::{extract_useful_env, RequestSnapshot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = serde_json::from_slice::<RequestSnapshot>(data) {
        let _ = extract_useful_env(&snapshot);
    }
});
