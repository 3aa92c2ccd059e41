//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, shared layers)
//!     → request.rs (request ID, caller identity, category)
//!     → middleware/rate_limit.rs (admission, /api only)
//!     → api.rs (validate, inspect, sanitize)
//!     → response.rs (JSON envelope or error mapping)
//!     → Send to client
//! ```

pub mod api;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use response::{ApiError, ApiResponse};
pub use server::{AppState, HttpServer};
