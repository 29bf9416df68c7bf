//! Emitter error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::key::EventKey;

/// Errors returned by emitter operations.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// The same callback is already registered for this event and context.
    #[error("listener {listener} is already registered for {event}{}", context_suffix(.with_context))]
    DuplicateListener {
        /// Event the registration was attempted for.
        event: EventKey,
        /// Label or address of the callback.
        listener: String,
        /// Whether the registration carried a context.
        with_context: bool,
    },

    /// Configuration could not be parsed.
    #[error("failed to parse emitter config: {source}")]
    ConfigParse {
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration file could not be read.
    #[error("failed to read emitter config {}: {source}", .path.display())]
    ConfigIo {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration value out of range.
    #[error("invalid emitter config: {field}: {message}")]
    InvalidConfig {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

fn context_suffix(with_context: &bool) -> &'static str {
    if *with_context { " with this context" } else { "" }
}

/// Result type for emitter operations.
pub type EmitterResult<T> = Result<T, EmitterError>;
