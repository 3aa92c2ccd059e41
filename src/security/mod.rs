//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming API request:
//!     → rate_limit.rs (per-caller, per-category admission)
//!     → threats.rs (inspect original payload, log findings)
//!     → sanitize.rs (strip, escape, normalize, truncate)
//!     → Handler uses sanitized text
//!
//! Every response:
//!     → headers.rs (security and cache headers)
//! ```
//!
//! # Design Decisions
//! - Admission and sanitization are independent; neither consults the other
//! - Denials are data, not errors: handlers decide how to report them
//! - Pattern stripping is a denylist heuristic, never the only defense
//! - No trust in client input

pub mod clock;
pub mod headers;
pub mod patterns;
pub mod rate_limit;
pub mod sanitize;
pub mod threats;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::{
    AdmissionControl, AdmissionDenied, RateLimitDecision, RateLimitPolicy, RateLimitStats,
    RateLimiter,
};
pub use sanitize::{sanitize, sanitize_value, SanitizeError, SanitizeOptions};
pub use threats::{detect_threats, sanitize_with_threat_detection, Threat, ThreatReport};
