//! Sensitive key matching.
//!
//! A key is sensitive when it equals a listed name, equals a listed
//! composite name, or when its innermost bracketed segment equals a listed
//! name. Matching is exact and case-sensitive: `my_access_token` does not
//! match `access_token`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// One `[segment]` of a form key like `user[profile][api_key]`.
static RE_BRACKET_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

/// Deny-list of sensitive key names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveKeySet {
    names: BTreeSet<String>,
    composites: BTreeSet<String>,
}

impl SensitiveKeySet {
    /// Build a set from flat names and verbatim composite names.
    pub fn new<I, J, S, T>(names: I, composites: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            composites: composites.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a set of flat names only.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, std::iter::empty::<String>())
    }

    /// Returns whether `key` names a sensitive value.
    pub fn contains(&self, key: &str) -> bool {
        if self.names.contains(key) || self.composites.contains(key) {
            return true;
        }
        innermost_segment(key).is_some_and(|segment| self.names.contains(segment))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.composites.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len() + self.composites.len()
    }
}

/// Last non-empty bracketed segment of a form key.
///
/// `pseudonym[password]` yields `password`, `a[b][]` yields `b`. When
/// every segment is empty the base name is used, so `password[]` yields
/// `password`. Keys with text after the final `]` are not composite and
/// yield nothing.
fn innermost_segment(key: &str) -> Option<&str> {
    if !key.ends_with(']') {
        return None;
    }
    RE_BRACKET_SEGMENT
        .captures_iter(key)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|segment| !segment.is_empty())
        .last()
        .or_else(|| key.split('[').next().filter(|base| !base.is_empty()))
}
