//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::security::rate_limit::{RateLimitPolicy, DEFAULT_CATEGORY};
use crate::security::sanitize::{
    CHAT_MESSAGE_MAX_LENGTH, DEFAULT_MAX_LENGTH, SEARCH_QUERY_MAX_LENGTH,
};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-category admission policies.
    pub rate_limit: RateLimitConfig,

    /// Length bounds for free-text fields.
    pub sanitization: SanitizationConfig,

    /// Response headers, CORS and body limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rate limiting configuration.
///
/// ```toml
/// [rate_limit]
/// enabled = true
///
/// [rate_limit.default]
/// window_ms = 60000
/// max_requests = 10
///
/// [rate_limit.categories.search]
/// window_ms = 60000
/// max_requests = 30
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on `/api/*`.
    pub enabled: bool,

    /// Policy for categories without their own entry.
    pub default: RateLimitPolicy,

    /// Named categories. Built-in `search` and `chat` apply unless overridden here.
    pub categories: HashMap<String, RateLimitPolicy>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default: RateLimitPolicy::new(60_000, 10),
            categories: HashMap::from([
                ("search".to_string(), RateLimitPolicy::new(60_000, 30)),
                ("chat".to_string(), RateLimitPolicy::new(60_000, 20)),
            ]),
        }
    }
}

impl RateLimitConfig {
    /// Every configured policy, including `default`, by category name.
    pub fn all_policies(&self) -> impl Iterator<Item = (&str, &RateLimitPolicy)> {
        std::iter::once((DEFAULT_CATEGORY, &self.default))
            .chain(self.categories.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

/// Sanitizer length bounds per field kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizationConfig {
    pub search_max_length: usize,
    pub chat_max_length: usize,
    pub default_max_length: usize,
}

impl Default for SanitizationConfig {
    fn default() -> Self {
        Self {
            search_max_length: SEARCH_QUERY_MAX_LENGTH,
            chat_max_length: CHAT_MESSAGE_MAX_LENGTH,
            default_max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Send Strict-Transport-Security. Only meaningful behind TLS.
    pub hsts: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Origins allowed by CORS. Empty disables CORS headers.
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            hsts: false,
            max_body_size: 64 * 1024,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3002".to_string(),
            ],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
