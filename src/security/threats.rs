//! Heuristic threat detection over untrusted text.
//!
//! Detection never changes the input. Findings are reported in a fixed
//! order: SQL injection, command injection, then each dangerous pattern in
//! list order.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::security::patterns::{
    COMMAND_INJECTION_PATTERNS, DANGEROUS_PATTERNS, SQL_INJECTION_PATTERNS,
};
use crate::security::sanitize::{sanitize, SanitizeOptions};

/// A category of suspicious content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threat {
    SqlInjection,
    CommandInjection,
    /// 1-based position in the dangerous-pattern list.
    DangerousPattern(usize),
}

impl Threat {
    /// Metric label for this kind of threat.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SqlInjection => "sql_injection",
            Self::CommandInjection => "command_injection",
            Self::DangerousPattern(_) => "dangerous_pattern",
        }
    }
}

impl fmt::Display for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqlInjection => write!(f, "SQL injection attempt"),
            Self::CommandInjection => write!(f, "command injection attempt"),
            Self::DangerousPattern(n) => write!(f, "dangerous pattern #{n}"),
        }
    }
}

impl Serialize for Threat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sanitized text together with what was found in the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatReport {
    pub sanitized: String,
    pub threats: Vec<Threat>,
}

impl ThreatReport {
    pub fn is_clean(&self) -> bool {
        self.threats.is_empty()
    }
}

pub fn detect_sql_injection(input: &str) -> bool {
    SQL_INJECTION_PATTERNS.iter().any(|p| p.is_match(input))
}

pub fn detect_command_injection(input: &str) -> bool {
    COMMAND_INJECTION_PATTERNS.iter().any(|p| p.is_match(input))
}

pub fn detect_threats(input: &str) -> Vec<Threat> {
    let mut threats = Vec::new();

    if detect_sql_injection(input) {
        threats.push(Threat::SqlInjection);
    }
    if detect_command_injection(input) {
        threats.push(Threat::CommandInjection);
    }
    threats.extend(
        DANGEROUS_PATTERNS
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_match(input))
            .map(|(i, _)| Threat::DangerousPattern(i + 1)),
    );

    threats
}

/// Inspect the original text, then sanitize it with default options.
pub fn sanitize_with_threat_detection(input: &str) -> ThreatReport {
    let threats = detect_threats(input);
    ThreatReport {
        sanitized: sanitize(input, &SanitizeOptions::default()),
        threats,
    }
}
