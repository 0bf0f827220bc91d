//! Header echo helpers.
//!
//! Converts a [`HeaderMap`] into the multi-valued JSON shape returned by the
//! echo endpoints, with canonical (`Content-Type`) header names, and applies
//! the configured exclude patterns.

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use regex::Regex;

/// Name → values map used for `args`, `headers`, `form` and `files`.
pub type Multimap = BTreeMap<String, Vec<String>>;

/// Error returned for exclude patterns that are not valid header names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid header pattern {0:?}")]
pub struct InvalidPattern(pub String);

/// Compiled header exclusion patterns.
///
/// Patterns are matched case-insensitively against the whole header name;
/// `*` matches any run of characters.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    regex: Regex,
}

impl HeaderFilter {
    /// Compile `patterns`. Returns `Ok(None)` when there is nothing to exclude.
    pub fn new(patterns: &[String]) -> Result<Option<Self>, InvalidPattern> {
        let mut alternatives = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            if !pattern.chars().all(|c| c == '*' || is_token_char(c)) {
                return Err(InvalidPattern(pattern.to_string()));
            }
            let escaped = pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            alternatives.push(escaped);
        }
        if alternatives.is_empty() {
            return Ok(None);
        }

        let source = format!("(?i)^(?:{})$", alternatives.join("|"));
        let regex = Regex::new(&source).map_err(|_| InvalidPattern(patterns.join(",")))?;
        Ok(Some(Self { regex }))
    }

    /// Returns true if the header should be hidden.
    pub fn excludes(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'+-.^_`|~".contains(c)
}

/// Canonical form of a header name: `x-forwarded-for` → `X-Forwarded-For`.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Collect headers into a [`Multimap`], skipping anything the filter excludes.
pub fn header_multimap(headers: &HeaderMap, filter: Option<&HeaderFilter>) -> Multimap {
    let mut out = Multimap::new();
    for (name, value) in headers {
        if filter.is_some_and(|f| f.excludes(name.as_str())) {
            continue;
        }
        out.entry(canonical_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}
