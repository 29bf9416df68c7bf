//! Emitter capability for host types.
//!
//! A host gains the emitter surface by implementing [`Emitter`], which only
//! asks where the host keeps its [`EventEmitter`]. Two ways to get there:
//!
//! - embed an `EventEmitter` field and call [`install_emitter!`] on the type;
//! - wrap a value you do not control in [`Evented`].
//!
//! Either way each instance owns its own emitter, and that emitter creates
//! its listener registry on first registration.
//!
//! [`install_emitter!`]: crate::install_emitter

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::config::EmitterConfig;
use crate::dispatch::DispatchReport;
use crate::emitter::EventEmitter;
use crate::error::EmitterResult;
use crate::event::Event;
use crate::key::{EventKey, Signal};
use crate::listener::{Callback, Context, ListenerInfo};

/// The emitter surface, available on any type that owns an [`EventEmitter`].
pub trait Emitter {
    /// The instance's emitter.
    fn emitter(&self) -> &EventEmitter;

    /// See [`EventEmitter::on`].
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::DuplicateListener`](crate::EmitterError::DuplicateListener)
    /// for a repeated registration.
    fn on(
        &self,
        key: impl Into<EventKey>,
        callback: &Callback,
        context: Option<&Context>,
    ) -> EmitterResult<()> {
        self.emitter().on(key, callback, context)
    }

    /// See [`EventEmitter::once`].
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::DuplicateListener`](crate::EmitterError::DuplicateListener)
    /// for a repeated registration.
    fn once(
        &self,
        key: impl Into<EventKey>,
        callback: &Callback,
        context: Option<&Context>,
    ) -> EmitterResult<()> {
        self.emitter().once(key, callback, context)
    }

    /// See [`EventEmitter::off`].
    fn off(
        &self,
        key: Option<&EventKey>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> usize {
        self.emitter().off(key, callback, context)
    }

    /// See [`EventEmitter::clear_listeners`].
    fn clear_listeners(&self, context: &Context) -> usize {
        self.emitter().clear_listeners(context)
    }

    /// See [`EventEmitter::trigger`].
    fn trigger<'a>(&self, signal: impl Into<Signal<'a>>, args: &[Value]) -> DispatchReport {
        self.emitter().trigger(signal, args)
    }

    /// See [`EventEmitter::emit`].
    fn emit<E: Event>(&self, event: &E, args: &[Value]) -> DispatchReport {
        self.emitter().emit(event, args)
    }

    /// See [`EventEmitter::listeners`].
    fn listeners(&self, key: impl Into<EventKey>) -> Vec<ListenerInfo> {
        self.emitter().listeners(key)
    }
}

impl Emitter for EventEmitter {
    fn emitter(&self) -> &EventEmitter {
        self
    }
}

/// Implement [`Emitter`] for a type with an embedded [`EventEmitter`] field.
///
/// ```rust
/// use tidings::{Callback, Emitter, EventEmitter, install_emitter};
///
/// #[derive(Default)]
/// struct Document {
///     title: String,
///     events: EventEmitter,
/// }
///
/// install_emitter!(Document, events);
///
/// let doc = Document::default();
/// let renamed = Callback::new(|_| Ok(()));
/// doc.on("renamed", &renamed, None).unwrap();
/// assert_eq!(doc.trigger("renamed", &[]).invoked, 1);
/// ```
#[macro_export]
macro_rules! install_emitter {
    ($host:ty, $field:ident) => {
        impl $crate::Emitter for $host {
            fn emitter(&self) -> &$crate::EventEmitter {
                &self.$field
            }
        }
    };
}

/// A value paired with its own emitter.
///
/// Gives emitter capability to types whose definition cannot carry an
/// [`EventEmitter`] field. Dereferences to the wrapped value.
#[derive(Debug, Default)]
pub struct Evented<T> {
    inner: T,
    events: EventEmitter,
}

impl<T> Evented<T> {
    /// Wrap `inner` with a default emitter.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            events: EventEmitter::new(),
        }
    }

    /// Wrap `inner` with a configured emitter.
    pub fn with_config(inner: T, config: EmitterConfig) -> Self {
        Self {
            inner,
            events: EventEmitter::with_config(config),
        }
    }

    /// The wrapped value.
    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Unwrap, dropping the emitter and its listeners.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Emitter for Evented<T> {
    fn emitter(&self) -> &EventEmitter {
        &self.events
    }
}

impl<T> Deref for Evented<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for Evented<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T> From<T> for Evented<T> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}
