//! Listener callbacks, contexts, and the records the registry stores.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;

use crate::emitter::EventEmitter;
use crate::event::{Event, EventType};
use crate::key::EventKey;

/// Result returned by a listener callback.
///
/// An `Err` is logged and counted by the dispatcher; it never reaches the
/// caller of `trigger`.
pub type ListenerResult = anyhow::Result<()>;

type Handler = dyn Fn(&Delivery<'_>) -> ListenerResult + Send + Sync;

/// A listener callback.
///
/// Callbacks are compared by identity: clones of one `Callback` are the same
/// listener, while two callbacks built from identical closures are not. Keep
/// a clone around to remove the listener later.
///
/// The `Send + Sync` bound lets an emitter be shared across threads; it does
/// not make concurrent triggers ordered with respect to each other.
#[derive(Clone)]
pub struct Callback {
    handler: Arc<Handler>,
    label: Option<Arc<str>>,
}

impl Callback {
    /// Wrap a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Delivery<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            label: None,
        }
    }

    /// Wrap a closure and give it a name for diagnostics.
    pub fn named<F>(label: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Delivery<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        let label: String = label.into();
        Self {
            handler: Arc::new(handler),
            label: Some(Arc::from(label)),
        }
    }

    /// Wrap a closure that receives the delivered instance as `E`.
    ///
    /// The instance is viewed as `E` through its declared ancestry, so a
    /// callback for a parent type works for every descendant. Deliveries
    /// that carry no instance, or one that cannot be viewed as `E`, fail
    /// with an error.
    pub fn typed<E, F>(handler: F) -> Self
    where
        E: EventType,
        F: Fn(&E, &Delivery<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        Self::new(move |delivery: &Delivery<'_>| {
            let Some(event) = delivery.event_as::<E>() else {
                anyhow::bail!(
                    "listener expected `{}` for {}",
                    std::any::type_name::<E>(),
                    delivery.key()
                );
            };
            handler(event, delivery)
        })
    }

    /// Name given with [`Callback::named`].
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether `self` and `other` are the same listener.
    #[must_use]
    pub fn same(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }

    pub(crate) fn call(&self, delivery: &Delivery<'_>) -> ListenerResult {
        (self.handler)(delivery)
    }

    /// Label or handler address, for log fields.
    pub(crate) fn describe(&self) -> String {
        match &self.label {
            Some(label) => label.to_string(),
            None => format!("{:p}", Arc::as_ptr(&self.handler).cast::<()>()),
        }
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.describe()).finish()
    }
}

/// Identity a listener is registered with.
///
/// Contexts group listeners (for [`clear_listeners`]) and distinguish
/// registrations of the same callback. They compare by identity, like
/// [`Callback`]. The wrapped value is available to the callback through
/// [`Delivery::context_as`].
///
/// [`clear_listeners`]: crate::EventEmitter::clear_listeners
#[derive(Clone)]
pub struct Context(Arc<dyn Any + Send + Sync>);

impl Context {
    /// New context owning `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Context sharing an existing allocation.
    ///
    /// Contexts built from clones of the same `Arc` are the same context.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// The wrapped value, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether `self` and `other` are the same context.
    #[must_use]
    pub fn same(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// One invocation of a listener.
pub struct Delivery<'a> {
    pub(crate) emitter: &'a EventEmitter,
    pub(crate) key: &'a EventKey,
    pub(crate) event: Option<&'a dyn Event>,
    pub(crate) args: &'a [Value],
    pub(crate) callback: &'a Callback,
    pub(crate) context: Option<&'a Context>,
}

impl<'a> Delivery<'a> {
    /// The emitter delivering the event.
    ///
    /// Listeners may register, remove, and trigger through it while they run.
    #[must_use]
    pub fn emitter(&self) -> &'a EventEmitter {
        self.emitter
    }

    /// The key this listener was registered under.
    ///
    /// For typed events this is the ancestor type that matched, not
    /// necessarily the instance's own type.
    #[must_use]
    pub fn key(&self) -> &'a EventKey {
        self.key
    }

    /// The triggered instance. `None` for named events.
    #[must_use]
    pub fn event(&self) -> Option<&'a dyn Event> {
        self.event
    }

    /// The triggered instance viewed as `E`.
    #[must_use]
    pub fn event_as<E: EventType>(&self) -> Option<&'a E> {
        self.event?.downcast_ref::<E>()
    }

    /// Extra arguments passed to `trigger`.
    #[must_use]
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Extra argument at `index`.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// The callback being invoked.
    #[must_use]
    pub fn callback(&self) -> &'a Callback {
        self.callback
    }

    /// The context the listener was registered with.
    #[must_use]
    pub fn context(&self) -> Option<&'a Context> {
        self.context
    }

    /// The listener's context value, if it is a `T`.
    #[must_use]
    pub fn context_as<T: Any>(&self) -> Option<&'a T> {
        self.context?.downcast_ref::<T>()
    }
}

impl fmt::Debug for Delivery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("key", self.key)
            .field("event", &self.event)
            .field("args", &self.args)
            .field("callback", self.callback)
            .finish_non_exhaustive()
    }
}

/// A registered listener.
pub(crate) struct ListenerRecord {
    pub(crate) key: EventKey,
    pub(crate) callback: Callback,
    pub(crate) context: Option<Context>,
    pub(crate) once: bool,
    active: AtomicBool,
}

impl ListenerRecord {
    pub(crate) fn new(
        key: EventKey,
        callback: Callback,
        context: Option<Context>,
        once: bool,
    ) -> Self {
        Self {
            key,
            callback,
            context,
            once,
            active: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the record inactive. Returns `true` only for the call that
    /// performed the transition.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    /// Whether this record holds exactly `(key, callback, context)`.
    pub(crate) fn holds(
        &self,
        key: &EventKey,
        callback: &Callback,
        context: Option<&Context>,
    ) -> bool {
        self.key == *key && self.callback.same(callback) && self.context.as_ref() == context
    }

    pub(crate) fn info(&self) -> ListenerInfo {
        ListenerInfo {
            event: self.key.clone(),
            label: self.callback.label().map(str::to_owned),
            has_context: self.context.is_some(),
            once: self.once,
        }
    }
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("key", &self.key)
            .field("callback", &self.callback)
            .field("context", &self.context)
            .field("once", &self.once)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Snapshot of an active listener, for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerInfo {
    /// Event the listener is registered for.
    pub event: EventKey,
    /// Callback label, if it was named.
    pub label: Option<String>,
    /// Whether it was registered with a context.
    pub has_context: bool,
    /// Whether it fires at most once.
    pub once: bool,
}
