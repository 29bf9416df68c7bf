//! Tidings Test - Shared test utilities for tidings.
//!
//! This crate provides recording listeners, typed event fixtures, and a
//! logging bootstrap that can be shared across test suites.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! tidings-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust
//! use tidings::EventEmitter;
//! use tidings_test::Recorder;
//!
//! let emitter = EventEmitter::new();
//! let recorder = Recorder::new();
//! emitter.on("saved", &recorder.listener("a"), None).unwrap();
//!
//! emitter.trigger("saved", &[]);
//! assert_eq!(recorder.labels(), vec!["a"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod recorder;

pub use fixtures::*;
pub use recorder::*;

/// Route `tracing` output through the test harness.
pub fn init_test_logging() {
    tidings_telemetry::setup_test_logging();
}
