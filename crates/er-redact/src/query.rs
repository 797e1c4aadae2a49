//! Query string and URL redaction.
//!
//! Rewrites `key=value` pairs in place. Only the value of a sensitive pair
//! changes; separators, ordering, and every other byte are kept verbatim.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

use crate::SensitiveKeySet;

// A `key=value` pair at the start of the query or after a `&`.
static RE_QUERY_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|&)([^&=]+)=([^&]*)").unwrap());

/// Percent-decode a raw query key for matching.
///
/// `pseudonym%5Bpassword%5D` decodes to `pseudonym[password]`.
fn decode_key(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['%', '+']) {
        return Cow::Borrowed(raw);
    }
    url::form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| Cow::Owned(key.into_owned()))
        .unwrap_or(Cow::Borrowed(raw))
}

/// Redact the values of sensitive pairs in a bare query (no leading `?`).
pub(crate) fn redact_pairs(query: &str, keys: &SensitiveKeySet, marker: &str) -> String {
    RE_QUERY_PAIR
        .replace_all(query, |caps: &Captures<'_>| {
            let key = &caps[2];
            let value = &caps[3];
            if !value.is_empty() && keys.contains(&decode_key(key)) {
                format!("{}{}={}", &caps[1], key, marker)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Redact a query string, preserving a leading `?` if present.
pub(crate) fn redact_query(qs: &str, keys: &SensitiveKeySet, marker: &str) -> String {
    match qs.strip_prefix('?') {
        Some(rest) => format!("?{}", redact_pairs(rest, keys, marker)),
        None => redact_pairs(qs, keys, marker),
    }
}

/// Redact the query component of a URL.
///
/// The query runs from the first `?` to the first following `#`. URLs
/// without a query are returned unchanged.
pub(crate) fn redact_uri(url: &str, keys: &SensitiveKeySet, marker: &str) -> String {
    let Some(start) = url.find('?') else {
        return url.to_string();
    };
    let (head, rest) = url.split_at(start + 1);
    let (query, fragment) = match rest.find('#') {
        Some(end) => rest.split_at(end),
        None => (rest, ""),
    };
    format!("{}{}{}", head, redact_pairs(query, keys, marker), fragment)
}
