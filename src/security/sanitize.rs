//! Untrusted text sanitization.
//!
//! # Pipeline
//! ```text
//! input
//!     → strip control characters (keeps \n \r \t)
//!     → strip dangerous patterns      (strip_dangerous)
//!     → strip dangerous tags          (strip_dangerous)
//!     → HTML-escape metacharacters    (!allow_markup)
//!     → normalize whitespace
//!     → truncate to max_length with "..."
//! ```
//!
//! Each stage works on the previous stage's output. The pipeline is pure
//! and may be called from any number of threads.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::security::patterns::{DANGEROUS_PATTERNS, TAG_PATTERNS};

pub const DEFAULT_MAX_LENGTH: usize = 10_000;
pub const SEARCH_QUERY_MAX_LENGTH: usize = 500;
pub const CHAT_MESSAGE_MAX_LENGTH: usize = 4_000;

const TRUNCATION_MARKER: &str = "...";

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("invalid whitespace pattern"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid newline pattern"));

/// Errors raised at the dynamically-typed boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// The value handed to the sanitizer was not text.
    #[error("input must be a string, got {found}")]
    InvalidInput { found: &'static str },
}

/// Per-call sanitizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Maximum output length in characters. `0` disables truncation.
    pub max_length: usize,
    /// Skip HTML escaping.
    pub allow_markup: bool,
    /// Remove denylisted patterns and tags.
    pub strip_dangerous: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            allow_markup: false,
            strip_dangerous: true,
        }
    }
}

impl SanitizeOptions {
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::default()
        }
    }

    pub fn search_query() -> Self {
        Self::with_max_length(SEARCH_QUERY_MAX_LENGTH)
    }

    pub fn chat_message() -> Self {
        Self::with_max_length(CHAT_MESSAGE_MAX_LENGTH)
    }
}

/// Run the full pipeline over `input`.
pub fn sanitize(input: &str, options: &SanitizeOptions) -> String {
    let mut text = remove_control_characters(input);

    if options.strip_dangerous {
        text = remove_dangerous_patterns(&text);
        text = remove_dangerous_tags(&text);
    }

    if !options.allow_markup {
        text = escape_html(&text);
    }

    let text = normalize_whitespace(&text);

    if options.max_length > 0 {
        truncate(&text, options.max_length)
    } else {
        text
    }
}

/// Sanitize a JSON value, rejecting anything that is not a string.
pub fn sanitize_value(
    value: &serde_json::Value,
    options: &SanitizeOptions,
) -> Result<String, SanitizeError> {
    match value {
        serde_json::Value::String(s) => Ok(sanitize(s, options)),
        other => Err(SanitizeError::InvalidInput {
            found: json_type_name(other),
        }),
    }
}

pub fn sanitize_search_query(query: &str) -> String {
    sanitize(query, &SanitizeOptions::search_query())
}

pub fn sanitize_chat_message(message: &str) -> String {
    sanitize(message, &SanitizeOptions::chat_message())
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn is_stripped_control(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}'..='\u{9f}'
    )
}

pub fn remove_control_characters(input: &str) -> String {
    input.chars().filter(|c| !is_stripped_control(*c)).collect()
}

pub fn remove_dangerous_patterns(input: &str) -> String {
    DANGEROUS_PATTERNS
        .iter()
        .fold(input.to_string(), |text, pattern| {
            pattern.replace_all(&text, "").into_owned()
        })
}

pub fn remove_dangerous_tags(input: &str) -> String {
    let mut text = input.to_string();
    for rules in TAG_PATTERNS.iter() {
        for rule in rules {
            if let Cow::Owned(replaced) = rule.replace_all(&text, "") {
                text = replaced;
            }
        }
    }
    text
}

/// Single-pass escape of `& < > " ' / ` =`.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn normalize_whitespace(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = HORIZONTAL_WS.replace_all(&unified, " ");
    let limited = EXCESS_NEWLINES.replace_all(&collapsed, "\n\n");
    limited.trim().to_string()
}

/// Cut `input` to at most `max_length` characters, marking the cut with
/// `...` when there is room for it.
///
/// Counts characters of already-escaped text, so the cut can land inside an
/// entity: `"&lt;&lt;"` at 6 becomes `"&lt..."`.
pub fn truncate(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        return input.to_string();
    }
    if max_length < TRUNCATION_MARKER.len() {
        return input.chars().take(max_length).collect();
    }
    let mut out: String = input
        .chars()
        .take(max_length - TRUNCATION_MARKER.len())
        .collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
