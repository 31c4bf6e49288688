#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Canonical identifier forms used throughout the model:
//! - `normalize_type_name`: upper camel case (`tree-node` -> `TreeNode`).
//! - `normalize_field_name`: lower camel case (`tree-node` -> `treeNode`).
//! - `to_router_path` / `from_router_path`: OpenAPI `{param}` templates to the
//!   router placeholder syntax and back.
//!
//! Only ASCII alphanumerics are word characters. A new segment starts at every
//! run of other characters and before every uppercase letter, so the
//! transforms are idempotent and acronyms such as `ID` survive.

use crate::config::PathStyle;
use regex::Regex;
use std::sync::OnceLock;

fn separator_re() -> &'static Regex {
    static SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();
    SEPARATOR_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex"))
}

fn template_param_re() -> &'static Regex {
    static TEMPLATE_RE: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_RE.get_or_init(|| Regex::new(r"\{([^}/]+)\}").expect("Invalid regex"))
}

fn colon_param_re() -> &'static Regex {
    static COLON_RE: OnceLock<Regex> = OnceLock::new();
    COLON_RE.get_or_init(|| Regex::new(r":([^/.:]+)").expect("Invalid regex"))
}

/// Splits an identifier into its words.
fn segments(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for run in separator_re().split(s) {
        if run.is_empty() {
            continue;
        }
        // `run` is pure ASCII, byte offsets are char offsets.
        let mut start = 0;
        for (i, c) in run.char_indices().skip(1) {
            if c.is_ascii_uppercase() {
                out.push(&run[start..i]);
                start = i;
            }
        }
        out.push(&run[start..]);
    }
    out
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => {
            let mut word = String::with_capacity(segment.len());
            word.push(first.to_ascii_uppercase());
            word.push_str(&chars.as_str().to_ascii_lowercase());
            word
        }
        None => String::new(),
    }
}

/// Converts kebab-case, snake_case, camelCase or free text to PascalCase.
///
/// Empty input yields an empty name; callers naming schemas must guard
/// against that themselves.
pub fn normalize_type_name(s: &str) -> String {
    segments(s).into_iter().map(title_case).collect()
}

/// Converts an identifier to camelCase: the first word lower-cased, the rest
/// title-cased.
pub fn normalize_field_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, segment) in segments(s).into_iter().enumerate() {
        if i == 0 {
            out.push_str(&segment.to_ascii_lowercase());
        } else {
            out.push_str(&title_case(segment));
        }
    }
    out
}

/// Converts an OpenAPI path template into the router's placeholder syntax.
///
/// e.g. `/board/{row}/{column}` -> `/board/:row/:column` for [`PathStyle::Colon`].
pub fn to_router_path(path: &str, style: PathStyle) -> String {
    match style {
        PathStyle::Colon => template_param_re().replace_all(path, ":$1").into_owned(),
        PathStyle::Braces => path.to_string(),
    }
}

/// Inverse of [`to_router_path`] for parameter names without `/`, `.` or `:`.
pub fn from_router_path(path: &str, style: PathStyle) -> String {
    match style {
        PathStyle::Colon => colon_param_re().replace_all(path, "{$1}").into_owned(),
        PathStyle::Braces => path.to_string(),
    }
}

/// Lists the template parameters of an OpenAPI path in order of appearance.
pub fn path_parameter_names(path: &str) -> Vec<String> {
    template_param_re()
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}
