//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tidings_telemetry::prelude::*;` to import all essential types.

// Logging
pub use crate::{
    LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging, setup_test_logging,
};

// Errors
pub use crate::{TelemetryError, TelemetryResult};
