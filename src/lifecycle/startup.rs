//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve and load the configuration file
//! - Fall back to defaults when no file is given
//!
//! # Design Decisions
//! - Fail fast: an unreadable or invalid file is fatal, never silently ignored

use std::path::Path;

use crate::config::{load_config, ConfigError, GatewayConfig};

/// Load the configuration at `path`, or defaults when there is none.
pub fn resolve_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(GatewayConfig::default()),
    }
}
