//! Tidings - synchronous in-process event emitter.
//!
//! This crate provides:
//! - An [`EventEmitter`] with `on`/`once`/`off`/`clear_listeners`/`trigger`
//! - Named events and typed events with declared ancestry
//! - Meta-events reporting unhandled events and listener changes
//! - The [`Emitter`] trait for giving any host type the same surface
//!
//! # Architecture
//!
//! Each emitter owns a registry of listener records, created on first
//! registration. `trigger` takes an ordered snapshot of the matching records
//! and re-checks every record right before calling it, so listeners can add,
//! remove, and trigger on the same emitter while an event is being delivered.
//! A failing or panicking listener is logged and skipped over; it never
//! stops delivery to the others and never surfaces to the caller.
//!
//! Three event types are synthesized by the emitter itself:
//!
//! 1. [`DeadEvent`] when a named event has no listeners.
//! 2. [`AddListenerEvent`] after every registration.
//! 3. [`RemoveListenerEvent`] for every listener removed.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tidings::{Callback, DeadEvent, EventEmitter, EventKey};
//!
//! let emitter = EventEmitter::new();
//!
//! let greet = Callback::new(|delivery| {
//!     println!("hello, {}", delivery.args()[0]);
//!     Ok(())
//! });
//! emitter.on("greet", &greet, None).unwrap();
//!
//! let report = emitter.trigger("greet", &[json!("world")]);
//! assert_eq!(report.invoked, 1);
//!
//! let unhandled = Callback::typed::<DeadEvent, _>(|dead, _| {
//!     println!("nobody listened to {}", dead.event);
//!     Ok(())
//! });
//! emitter.on(EventKey::of::<DeadEvent>(), &unhandled, None).unwrap();
//! assert!(emitter.trigger("farewell", &[]).unhandled);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod dispatch;
mod emitter;
mod error;
mod event;
mod key;
mod listener;
mod mixin;
mod registry;

pub use config::EmitterConfig;
pub use dispatch::DispatchReport;
pub use emitter::EventEmitter;
pub use error::{EmitterError, EmitterResult};
pub use event::{AddListenerEvent, DeadEvent, Event, EventType, RemoveListenerEvent};
pub use key::{EventKey, Signal, TypeKey};
pub use listener::{Callback, Context, Delivery, ListenerInfo, ListenerResult};
pub use mixin::{Emitter, Evented};
