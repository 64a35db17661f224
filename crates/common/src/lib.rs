//! Shotcraft Common Utilities
//!
//! Shared infrastructure for all Shotcraft crates:
//! - Error types and result aliases
//! - Session clock for timestamping pointer input
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
