//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Validate → Build server → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Servers stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, metrics, listeners
//! - One broadcast channel reaches the API and admin servers alike

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
