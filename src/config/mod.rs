//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared with the HTTP server, limiter and sanitizer settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; rate-limit policies never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, RateLimitConfig,
    SanitizationConfig, SecurityConfig, TimeoutConfig,
};
