//! Placeholder substitution
//!
//! Template content may contain `{{name}}` tokens, where `name` is one or
//! more ASCII word characters (letters, digits, underscore). Anything else
//! that merely looks like a token (`{name}`, `{{ name }}`, `{{a-b}}`) is
//! plain text and passes through.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern is valid"));

/// Distinct placeholder names in order of first occurrence
pub fn extract_placeholders(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(content) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Substitute every placeholder that has an entry in `values`
///
/// An empty value is substituted as-is. Placeholders without an entry are
/// left in place.
pub fn render(content: &str, values: &HashMap<String, String>) -> String {
    substitute(content, |name| values.get(name).map(String::as_str))
}

/// Like [`render`], but empty values leave the `{{name}}` token visible
pub fn preview(content: &str, values: &HashMap<String, String>) -> String {
    substitute(content, |name| {
        values.get(name).map(String::as_str).filter(|v| !v.is_empty())
    })
}

/// Placeholders that still have no non-empty value
pub fn unfilled(content: &str, values: &HashMap<String, String>) -> Vec<String> {
    extract_placeholders(content)
        .into_iter()
        .filter(|name| values.get(name).is_none_or(|v| v.is_empty()))
        .collect()
}

// Single pass over the original text, so substituted values are never rescanned
fn substitute<'v>(content: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &Captures| match lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
