//! Oracle Gateway Library
//!
//! Fixed-window admission control and untrusted-text sanitization, plus the
//! axum gateway that applies them to the Oracle search and chat APIs.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{RateLimiter, SanitizeOptions};
