//! Recording listeners.
//!
//! A [`Recorder`] hands out callbacks that log every invocation into shared
//! state, so tests can assert on who was called, in what order, and with
//! what arguments.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tidings::{
    AddListenerEvent, Callback, DeadEvent, Delivery, EmitterResult, EventEmitter, EventKey,
    ListenerResult, RemoveListenerEvent, TypeKey,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking listener poisons nothing we care about.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Label of the recording callback.
    pub label: String,
    /// Key the listener was registered under.
    pub key: EventKey,
    /// Concrete type of the delivered instance, if any.
    pub event_type: Option<TypeKey>,
    /// Arguments delivered with the event.
    pub args: Vec<Value>,
}

/// Shared invocation log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, label: &str, delivery: &Delivery<'_>) {
        lock(&self.calls).push(Call {
            label: label.to_owned(),
            key: delivery.key().clone(),
            event_type: delivery.event().map(|event| event.type_key()),
            args: delivery.args().to_vec(),
        });
    }

    /// A callback that records and succeeds.
    #[must_use]
    pub fn listener(&self, label: &str) -> Callback {
        self.wrap(label, |_| Ok(()))
    }

    /// A callback that records and then returns an error.
    #[must_use]
    pub fn failing(&self, label: &str) -> Callback {
        let message = format!("{label} failed");
        self.wrap(label, move |_| Err(anyhow::anyhow!("{message}")))
    }

    /// A callback that records and then panics.
    #[must_use]
    pub fn panicking(&self, label: &str) -> Callback {
        let message = format!("{label} panicked");
        self.wrap(label, move |_| panic!("{message}"))
    }

    /// A callback that records and then runs `handler`.
    pub fn wrap<F>(&self, label: &str, handler: F) -> Callback
    where
        F: Fn(&Delivery<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        let recorder = self.clone();
        let owned = label.to_owned();
        Callback::named(label, move |delivery| {
            recorder.record(&owned, delivery);
            handler(delivery)
        })
    }

    /// Every invocation so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Labels of every invocation so far, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.label.clone()).collect()
    }

    /// How often `label` was invoked.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.label == label).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

#[derive(Debug, Default)]
struct MetaLog {
    dead: Vec<DeadEvent>,
    added: Vec<EventKey>,
    removed: Vec<EventKey>,
}

/// Records the meta-events an emitter synthesizes.
#[derive(Debug, Clone)]
pub struct MetaRecorder {
    log: Arc<Mutex<MetaLog>>,
    on_dead: Callback,
    on_add: Callback,
    on_remove: Callback,
}

impl MetaRecorder {
    /// Register meta listeners on `emitter`.
    ///
    /// Listeners are registered for `DeadEvent`, `AddListenerEvent` and
    /// `RemoveListenerEvent` in that order, so the log starts with the
    /// announcement of the last registration. Call [`reset`](Self::reset)
    /// for a clean slate.
    ///
    /// # Errors
    ///
    /// Fails if the emitter rejects a registration.
    pub fn attach(emitter: &EventEmitter) -> EmitterResult<Self> {
        let log = Arc::new(Mutex::new(MetaLog::default()));

        let sink = Arc::clone(&log);
        let on_dead = Callback::typed::<DeadEvent, _>(move |event, _| {
            lock(&sink).dead.push(event.clone());
            Ok(())
        });
        let sink = Arc::clone(&log);
        let on_add = Callback::typed::<AddListenerEvent, _>(move |event, _| {
            lock(&sink).added.push(event.event.clone());
            Ok(())
        });
        let sink = Arc::clone(&log);
        let on_remove = Callback::typed::<RemoveListenerEvent, _>(move |event, _| {
            lock(&sink).removed.push(event.event.clone());
            Ok(())
        });

        emitter.on(EventKey::of::<DeadEvent>(), &on_dead, None)?;
        emitter.on(EventKey::of::<AddListenerEvent>(), &on_add, None)?;
        emitter.on(EventKey::of::<RemoveListenerEvent>(), &on_remove, None)?;

        Ok(Self {
            log,
            on_dead,
            on_add,
            on_remove,
        })
    }

    /// The `RemoveListenerEvent` callback, for removing it in tests.
    #[must_use]
    pub fn remove_listener(&self) -> &Callback {
        &self.on_remove
    }

    /// The `DeadEvent` callback.
    #[must_use]
    pub fn dead_listener(&self) -> &Callback {
        &self.on_dead
    }

    /// The `AddListenerEvent` callback.
    #[must_use]
    pub fn add_listener(&self) -> &Callback {
        &self.on_add
    }

    /// Dead events seen so far.
    #[must_use]
    pub fn dead(&self) -> Vec<DeadEvent> {
        lock(&self.log).dead.clone()
    }

    /// Keys announced by `AddListenerEvent`, in order.
    #[must_use]
    pub fn added(&self) -> Vec<EventKey> {
        lock(&self.log).added.clone()
    }

    /// Keys announced by `RemoveListenerEvent`, in order.
    #[must_use]
    pub fn removed(&self) -> Vec<EventKey> {
        lock(&self.log).removed.clone()
    }

    /// Forget everything recorded so far.
    pub fn reset(&self) {
        let mut log = lock(&self.log);
        log.dead.clear();
        log.added.clear();
        log.removed.clear();
    }
}
