//! The event emitter.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EmitterConfig;
use crate::dispatch::{self, DispatchReport};
use crate::error::{EmitterError, EmitterResult};
use crate::event::{AddListenerEvent, Event, RemoveListenerEvent};
use crate::key::{EventKey, Signal, TypeKey};
use crate::listener::{Callback, Context, ListenerInfo, ListenerRecord};
use crate::registry::{Registry, Selector};

/// Synchronous publish/subscribe hub.
///
/// All operations take `&self`; listeners receive the emitter through
/// [`Delivery::emitter`](crate::Delivery::emitter) and may call back into it
/// while an event is being delivered. The listener registry is only created
/// by the first [`on`](Self::on) or [`once`](Self::once), so an emitter that
/// never gains listeners stays a couple of words in size.
///
/// The emitter is `Send + Sync` so it can live inside shared host state, but
/// delivery is designed around a single thread. Triggers issued from several
/// threads at once each run to completion on their own thread with no
/// ordering guarantee between them, and a listener removed on one thread may
/// still be mid-call on another.
#[derive(Default)]
pub struct EventEmitter {
    registry: OnceLock<Registry>,
    config: EmitterConfig,
}

impl EventEmitter {
    /// Create an emitter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an emitter with the given configuration.
    #[must_use]
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            registry: OnceLock::new(),
            config,
        }
    }

    /// The emitter's configuration.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Whether the listener registry has been created yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.registry.get().is_some()
    }

    pub(crate) fn registry(&self) -> Option<&Registry> {
        self.registry.get()
    }

    fn registry_or_init(&self) -> &Registry {
        self.registry.get_or_init(|| {
            debug!(emitter = self.config.log_label(), "Listener registry created");
            Registry::new()
        })
    }

    /// Register a listener for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::DuplicateListener`] if `callback` is already
    /// registered for `key` with the same context. Nothing is registered in
    /// that case.
    pub fn on(
        &self,
        key: impl Into<EventKey>,
        callback: &Callback,
        context: Option<&Context>,
    ) -> EmitterResult<()> {
        self.register(key.into(), callback, context, false)
    }

    /// Register a listener that is removed before its first invocation.
    ///
    /// # Errors
    ///
    /// Same as [`EventEmitter::on`].
    pub fn once(
        &self,
        key: impl Into<EventKey>,
        callback: &Callback,
        context: Option<&Context>,
    ) -> EmitterResult<()> {
        self.register(key.into(), callback, context, true)
    }

    fn register(
        &self,
        key: EventKey,
        callback: &Callback,
        context: Option<&Context>,
        once: bool,
    ) -> EmitterResult<()> {
        let record = ListenerRecord::new(key, callback.clone(), context.cloned(), once);
        let record = self.registry_or_init().insert(record).map_err(|rejected| {
            warn!(
                emitter = self.config.log_label(),
                event = %rejected.key,
                listener = %rejected.callback.describe(),
                "Duplicate listener rejected"
            );
            EmitterError::DuplicateListener {
                listener: rejected.callback.describe(),
                with_context: rejected.context.is_some(),
                event: rejected.key,
            }
        })?;

        debug!(
            emitter = self.config.log_label(),
            event = %record.key,
            listener = %record.callback.describe(),
            once,
            "Listener registered"
        );

        if self.config.meta_events {
            let added = AddListenerEvent {
                event: record.key.clone(),
                listener: record.callback.clone(),
                context: record.context.clone(),
            };
            self.emit(&added, &[]);
        }

        Ok(())
    }

    /// Remove listeners.
    ///
    /// - `off(None, None, None)` removes every listener.
    /// - `off(Some(key), None, None)` removes every listener for `key`.
    /// - `off(Some(key), Some(cb), None)` removes `cb` from `key` where it was
    ///   registered without a context.
    /// - `off(Some(key), Some(cb), Some(ctx))` removes exactly that listener.
    ///
    /// A `context` without a `callback` removes every listener registered
    /// with that context (under `key` if one is given), and a `callback`
    /// without a `key` is looked up under every key. Nothing matching is not
    /// an error.
    ///
    /// Returns the number of listeners removed. A `RemoveListenerEvent` is
    /// delivered for each of them, in removal order.
    pub fn off(
        &self,
        key: Option<&EventKey>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> usize {
        self.remove(&Selector {
            key,
            callback,
            context,
        })
    }

    /// Remove every listener.
    pub fn off_all(&self) -> usize {
        self.off(None, None, None)
    }

    /// Remove every listener for `key`.
    pub fn off_event(&self, key: impl Into<EventKey>) -> usize {
        let key = key.into();
        self.off(Some(&key), None, None)
    }

    /// Remove `callback` from `key` for exactly `context`.
    pub fn off_listener(
        &self,
        key: impl Into<EventKey>,
        callback: &Callback,
        context: Option<&Context>,
    ) -> usize {
        let key = key.into();
        self.off(Some(&key), Some(callback), context)
    }

    /// Remove every listener registered with `context`, for any event.
    pub fn clear_listeners(&self, context: &Context) -> usize {
        self.off(None, None, Some(context))
    }

    fn remove(&self, selector: &Selector<'_>) -> usize {
        let Some(registry) = self.registry() else {
            return 0;
        };

        let audience = if self.config.meta_events {
            dispatch::collect(registry, &TypeKey::of::<RemoveListenerEvent>().ancestry())
        } else {
            Vec::new()
        };

        let removed = registry.remove(selector);
        for record in &removed {
            debug!(
                emitter = self.config.log_label(),
                event = %record.key,
                listener = %record.callback.describe(),
                "Listener removed"
            );
        }

        if self.config.meta_events {
            dispatch::announce_removals(self, &audience, &removed);
        }

        removed.len()
    }

    /// Retire a `once` record that dispatch is about to invoke, announcing
    /// the removal like any other.
    pub(crate) fn consume(&self, record: &Arc<ListenerRecord>) -> bool {
        let Some(registry) = self.registry() else {
            return false;
        };
        if !registry.retire(record) {
            return false;
        }

        debug!(
            emitter = self.config.log_label(),
            event = %record.key,
            listener = %record.callback.describe(),
            "Once listener consumed"
        );

        if self.config.meta_events {
            let notice = RemoveListenerEvent {
                event: record.key.clone(),
                listener: record.callback.clone(),
                context: record.context.clone(),
            };
            self.emit(&notice, &[]);
        }

        true
    }

    /// Deliver an event synchronously.
    ///
    /// Named events go to the listeners of that name; when there are none a
    /// [`DeadEvent`](crate::DeadEvent) is delivered instead. Typed instances
    /// go to the listeners of their type and of every ancestor type, nearest
    /// first. Listener errors and panics are logged and counted, never
    /// returned.
    pub fn trigger<'a>(&self, signal: impl Into<Signal<'a>>, args: &[Value]) -> DispatchReport {
        dispatch::dispatch(self, signal.into(), args)
    }

    /// Deliver a typed instance. Shorthand for
    /// `trigger(Signal::Instance(event), args)`.
    pub fn emit<E: Event>(&self, event: &E, args: &[Value]) -> DispatchReport {
        self.trigger(Signal::Instance(event), args)
    }

    /// Number of active listeners for `key`.
    #[must_use]
    pub fn listener_count(&self, key: impl Into<EventKey>) -> usize {
        let key = key.into();
        self.registry().map_or(0, |registry| registry.count(&key))
    }

    /// Number of active listeners across all events.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.registry().map_or(0, Registry::total)
    }

    /// Whether `key` has any active listener.
    #[must_use]
    pub fn has_listeners(&self, key: impl Into<EventKey>) -> bool {
        self.listener_count(key) > 0
    }

    /// Active listeners for `key`, in registration order.
    #[must_use]
    pub fn listeners(&self, key: impl Into<EventKey>) -> Vec<ListenerInfo> {
        let key = key.into();
        self.registry()
            .map(|registry| registry.infos(&key))
            .unwrap_or_default()
    }

    /// Events with active listeners, in first-registration order.
    #[must_use]
    pub fn event_keys(&self) -> Vec<EventKey> {
        self.registry().map(Registry::keys).unwrap_or_default()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("label", &self.config.label)
            .field("listeners", &self.total_listeners())
            .finish_non_exhaustive()
    }
}
