//! Redaction and encoding repair for error report payloads.
//!
//! This crate turns raw error context (URLs, query strings, parameter maps,
//! HTTP-like environment data) into a representation that is safe to store
//! and display:
//!
//! - **Key-based redaction**: values whose key is on the sensitive list are
//!   replaced with the fixed marker `[FILTERED]`. Bracket-composite form keys
//!   such as `pseudonym[password]` are matched on their innermost segment.
//! - **Query and URL redaction**: `key=value` pairs are rewritten in place,
//!   leaving every other byte of the input untouched.
//! - **Encoding repair**: invalid UTF-8 sequences are stripped from a private
//!   copy of the input. Repair never fails.
//!
//! Redaction and repair are separate passes: repair walks nested structures,
//! redaction only looks at top-level keys unless the policy enables
//! `redact_nested`.
//!
//! # Example
//!
//! ```
//! use er_redact::{RedactionPolicy, Sanitizer};
//!
//! let sanitizer = Sanitizer::new(RedactionPolicy::default()).unwrap();
//!
//! let url = sanitizer.redact_url("https://example.com?access_token=abcdef");
//! assert_eq!(url, "https://example.com?access_token=[FILTERED]");
//!
//! let qs = sanitizer.redact_query_string("access_token=abcdef&pseudonym[password]=zzz");
//! assert_eq!(qs, "access_token=[FILTERED]&pseudonym[password]=[FILTERED]");
//! ```

pub mod engine;
pub mod error;
pub mod keys;
pub mod policy;
pub mod query;
pub mod request;
pub mod sanitize;
pub mod value;

pub use engine::{
    default_sanitizer, extract_useful_env, redact_mapping, redact_query_string, redact_url,
    SanitizedContext, Sanitizer,
};
pub use error::{RedactionError, Result};
pub use keys::SensitiveKeySet;
pub use policy::{RedactionPolicy, FILTERED_MARKER};
pub use request::{RequestLike, RequestSnapshot};
pub use sanitize::{repair_utf8, sanitize_bytes, sanitize_map};
pub use value::{ContextMap, ContextValue};
