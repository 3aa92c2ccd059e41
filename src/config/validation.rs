//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, caps > 0, lengths > 0)
//! - Check addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::security::validate::is_valid_url;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("rate_limit.{category}: window_ms must be greater than zero")]
    ZeroWindow { category: String },

    #[error("rate_limit.{category}: max_requests must be greater than zero")]
    ZeroMaxRequests { category: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("admin.api_key must be changed when the admin API is enabled")]
    PlaceholderApiKey,

    #[error("security.allowed_origins: {0:?} is neither \"*\" nor an http(s) URL")]
    InvalidOrigin(String),
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }

    for origin in &config.security.allowed_origins {
        if origin != "*" && !is_valid_url(origin) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    let mut policies: Vec<_> = config.rate_limit.all_policies().collect();
    policies.sort_by_key(|(name, _)| *name);
    for (category, policy) in policies {
        if policy.window_ms == 0 {
            errors.push(ValidationError::ZeroWindow {
                category: category.to_string(),
            });
        }
        if policy.max_requests == 0 {
            errors.push(ValidationError::ZeroMaxRequests {
                category: category.to_string(),
            });
        }
    }

    let positive = [
        ("timeouts.request_secs", config.timeouts.request_secs as usize),
        ("security.max_body_size", config.security.max_body_size),
        ("sanitization.search_max_length", config.sanitization.search_max_length),
        ("sanitization.chat_max_length", config.sanitization.chat_max_length),
        ("sanitization.default_max_length", config.sanitization.default_max_length),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::rate_limit::RateLimitPolicy;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.rate_limit.default = RateLimitPolicy::new(0, 0);
        config.sanitization.chat_max_length = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAddress {
                    field: "listener.bind_address",
                    value: "nowhere".to_string(),
                },
                ValidationError::ZeroWindow {
                    category: "default".to_string(),
                },
                ValidationError::ZeroMaxRequests {
                    category: "default".to_string(),
                },
                ValidationError::Zero {
                    field: "sanitization.chat_max_length",
                },
            ]
        );
    }

    #[test]
    fn test_enabled_admin_needs_real_key() {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::PlaceholderApiKey])
        );

        config.admin.api_key = "s3cret".to_string();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_allowed_origins() {
        let mut config = GatewayConfig::default();
        config.security.allowed_origins = vec![
            "*".to_string(),
            "https://oracle.example.com".to_string(),
            "oracle.example.com".to_string(),
            "ftp://files.example.com".to_string(),
        ];
        assert_eq!(
            validate_config(&config),
            Err(vec![
                ValidationError::InvalidOrigin("oracle.example.com".to_string()),
                ValidationError::InvalidOrigin("ftp://files.example.com".to_string()),
            ])
        );
    }
}
