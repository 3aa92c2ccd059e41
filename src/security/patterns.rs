//! Denylist patterns shared by sanitization and threat detection.
//!
//! These are heuristics. Split tags, entity-encoded payloads and nested
//! markup can slip through; output encoding at the render boundary is still
//! required.

use std::sync::LazyLock;

use regex::Regex;

/// Tags removed together with their content.
pub const DANGEROUS_TAGS: &[&str] = &[
    "script", "object", "embed", "link", "style", "iframe", "frame", "frameset", "applet",
    "meta", "form", "input", "button", "textarea", "select", "option", "base", "body", "html",
    "head",
];

/// Pseudo-protocols, inline handlers, evaluation calls and script openers.
/// Threat reports refer to these by 1-based position.
pub static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)data:",
        r"(?i)on[a-z0-9_]+\s*=",
        r"(?i)<script",
        r"(?i)eval\s*\(",
        r"(?i)expression\s*\(",
        r"(?i)import\s*\(",
        r"(?i)require\s*\(",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid dangerous pattern"))
    .collect()
});

/// Per-tag removal rules, applied in order: paired, self-closing, lone opener.
pub static TAG_PATTERNS: LazyLock<Vec<[Regex; 3]>> = LazyLock::new(|| {
    DANGEROUS_TAGS
        .iter()
        .map(|tag| {
            [
                Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")),
                Regex::new(&format!(r"(?i)<{tag}[^>]*/>")),
                Regex::new(&format!(r"(?i)<{tag}[^>]*>")),
            ]
            .map(|r| r.expect("invalid tag pattern"))
        })
        .collect()
});

pub static SQL_INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)('|(\\')|(;\s*(drop|delete|insert|update|select|union|exec|execute)))",
        r"(?i)(union\s+select|information_schema|sysobjects|syscolumns)",
        r"(?i)\b(or|and)\s+\d+\s*=\s*\d+",
        r#"('.*'=.*'|".*"=.*")"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid sql pattern"))
    .collect()
});

pub static COMMAND_INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"[;&|`$(){}\[\]\\]",
        r"(?i)(rm\s+|del\s+|format\s+)",
        r"(?i)(wget\s+|curl\s+|nc\s+|netcat\s+)",
        r"(?i)\|\s*(ls|dir|cat|type|more|less)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid command pattern"))
    .collect()
});
