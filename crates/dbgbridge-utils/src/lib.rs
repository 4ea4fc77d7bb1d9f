//! # dbgbridge Utilities
//!
//! Shared logging setup for hosts that embed `dbgbridge-core`.
//!
//! The core crate only emits `tracing` events. This crate decides where they
//! go: console, JSON, a rolling log file, or the test harness's captured
//! output.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, init_test_logging, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
