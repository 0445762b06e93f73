//! Placeholder scanning and substitution for `{{name}}` tokens.
//!
//! Substitution is a single simultaneous pass: every token in the input is
//! resolved against the variable map once, and replacement text is never
//! rescanned. A value that itself looks like `{{other}}` is inserted literally.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([^{}\r\n]+?)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Replaces every placeholder whose name is a key of `variables` with its value.
/// Unknown placeholders are left byte-for-byte as they were.
pub fn substitute(body: &str, variables: &BTreeMap<String, String>) -> String {
    if variables.is_empty() {
        return body.to_string();
    }

    placeholder_pattern()
        .replace_all(body, |caps: &Captures| match variables.get(caps[1].trim()) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Distinct placeholder names appearing in `body`.
pub fn placeholder_names(body: &str) -> BTreeSet<String> {
    placeholder_pattern()
        .captures_iter(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Placeholder names present in `original` but absent from `rewritten`.
pub fn missing_placeholders(original: &str, rewritten: &str) -> Vec<String> {
    let kept = placeholder_names(rewritten);
    placeholder_names(original)
        .into_iter()
        .filter(|name| !kept.contains(name))
        .collect()
}

/// Placeholder names in `body` with no matching key in `variables`.
pub fn unresolved_placeholders(body: &str, variables: &BTreeMap<String, String>) -> Vec<String> {
    placeholder_names(body)
        .into_iter()
        .filter(|name| !variables.contains_key(name))
        .collect()
}

/// True when `name` can be written as a placeholder token.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['{', '}', '\n', '\r'])
}
