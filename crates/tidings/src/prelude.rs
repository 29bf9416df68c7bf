//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tidings::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use tidings::prelude::*;
//!
//! let emitter = EventEmitter::new();
//! let listener = Callback::new(|_| Ok(()));
//! emitter.on("ready", &listener, None).unwrap();
//! emitter.trigger("ready", &[]);
//! ```

// Emitter
pub use crate::{DispatchReport, EmitterConfig, EventEmitter};

// Host capability
pub use crate::{Emitter, Evented, install_emitter};

// Keys and events
pub use crate::{AddListenerEvent, DeadEvent, Event, EventKey, EventType, RemoveListenerEvent, Signal, TypeKey};

// Listeners
pub use crate::{Callback, Context, Delivery, ListenerResult};

// Errors
pub use crate::{EmitterError, EmitterResult};
