//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing a log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or a directive is not a valid filter.
    #[error("invalid log filter `{directive}`: {message}")]
    InvalidFilter {
        /// The rejected level or directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber could not be installed.
    #[error("failed to install log subscriber: {0}")]
    InitError(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
