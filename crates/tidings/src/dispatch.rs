//! Event delivery.
//!
//! Every dispatch pass copies the matching records once, up front, and checks
//! each record's liveness again right before calling it. Listeners are free
//! to register, remove, and trigger on the same emitter while they run:
//! records removed or consumed mid-pass are skipped, records added mid-pass
//! wait for the next pass, and nested passes run to completion before the
//! outer pass continues.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::emitter::EventEmitter;
use crate::event::{DeadEvent, Event, RemoveListenerEvent};
use crate::key::{EventKey, Signal, TypeKey};
use crate::listener::{Delivery, ListenerRecord};
use crate::registry::Registry;

/// Outcome of one dispatch pass.
///
/// Counts cover the listeners of this pass only, not nested triggers or
/// synthesized meta-events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Records in the snapshot.
    pub matched: usize,
    /// Callbacks invoked, including those that failed.
    pub invoked: usize,
    /// Callbacks that returned an error or panicked.
    pub failed: usize,
    /// Snapshot entries skipped because they were no longer active.
    pub skipped: usize,
    /// No listener matched the event.
    pub unhandled: bool,
}

impl DispatchReport {
    /// Callbacks that completed without error.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.invoked.saturating_sub(self.failed)
    }
}

/// Why a listener invocation failed.
#[derive(Debug)]
enum Failure {
    Error(anyhow::Error),
    Panic(String),
}

/// Deliver `signal` to the matching listeners of `emitter`.
pub(crate) fn dispatch(emitter: &EventEmitter, signal: Signal<'_>, args: &[Value]) -> DispatchReport {
    match signal {
        Signal::Named(name) => dispatch_named(emitter, &EventKey::name(name), args),
        Signal::Instance(event) => dispatch_instance(emitter, event, args),
    }
}

fn dispatch_named(emitter: &EventEmitter, key: &EventKey, args: &[Value]) -> DispatchReport {
    let snapshot = emitter
        .registry()
        .map(|registry| registry.snapshot(key))
        .unwrap_or_default();

    if snapshot.is_empty() {
        trace!(
            emitter = emitter.config().log_label(),
            event = %key,
            "No listeners for event"
        );
        if emitter.config().dead_events {
            let dead = DeadEvent {
                event: key.clone(),
                data: args.to_vec(),
            };
            dispatch_instance(emitter, &dead, &[]);
        }
        return DispatchReport {
            unhandled: true,
            ..DispatchReport::default()
        };
    }

    deliver(emitter, key, &snapshot, None, args, &mut Vec::new())
}

fn dispatch_instance(emitter: &EventEmitter, event: &dyn Event, args: &[Value]) -> DispatchReport {
    let snapshot = emitter
        .registry()
        .map(|registry| collect(registry, &event.ancestor_types()))
        .unwrap_or_default();

    let key = EventKey::Type(event.type_key());
    if snapshot.is_empty() {
        trace!(
            emitter = emitter.config().log_label(),
            event = %key,
            "No listeners for typed event"
        );
        return DispatchReport {
            unhandled: true,
            ..DispatchReport::default()
        };
    }

    deliver(emitter, &key, &snapshot, Some(event), args, &mut Vec::new())
}

/// Listeners for every type in `types`, in that order.
pub(crate) fn collect(registry: &Registry, types: &[TypeKey]) -> Vec<Arc<ListenerRecord>> {
    types
        .iter()
        .flat_map(|ty| registry.snapshot(&EventKey::Type(*ty)))
        .collect()
}

/// Announce removed records to the `RemoveListenerEvent` listeners captured
/// before the removal.
///
/// Records removed by the same operation stay in the audience, so a removal
/// listener also hears about its own removal. A `once` listener among them
/// still hears only the first notice.
pub(crate) fn announce_removals(
    emitter: &EventEmitter,
    audience: &[Arc<ListenerRecord>],
    removed: &[Arc<ListenerRecord>],
) {
    if audience.is_empty() {
        return;
    }

    let mut spared = removed.to_vec();
    for record in removed {
        let notice = RemoveListenerEvent {
            event: record.key.clone(),
            listener: record.callback.clone(),
            context: record.context.clone(),
        };
        let key = EventKey::Type(notice.type_key());
        deliver(emitter, &key, audience, Some(&notice), &[], &mut spared);
    }
}

/// Run a snapshot.
///
/// `spared` records are invoked even though they are inactive; they were
/// retired by the operation that started this pass. A spared `once` record
/// leaves `spared` on its first call, so later passes skip it.
fn deliver(
    emitter: &EventEmitter,
    key: &EventKey,
    snapshot: &[Arc<ListenerRecord>],
    event: Option<&dyn Event>,
    args: &[Value],
    spared: &mut Vec<Arc<ListenerRecord>>,
) -> DispatchReport {
    let label = emitter.config().log_label();
    let mut report = DispatchReport {
        matched: snapshot.len(),
        ..DispatchReport::default()
    };

    trace!(
        emitter = label,
        event = %key,
        listeners = snapshot.len(),
        "Dispatching event"
    );

    for record in snapshot {
        match spared.iter().position(|s| Arc::ptr_eq(s, record)) {
            Some(index) => {
                if record.once {
                    spared.swap_remove(index);
                }
            },
            None => {
                if !record.is_active() {
                    report.skipped = report.skipped.saturating_add(1);
                    continue;
                }
                if record.once && !emitter.consume(record) {
                    report.skipped = report.skipped.saturating_add(1);
                    continue;
                }
            },
        }

        let delivery = Delivery {
            emitter,
            key: &record.key,
            event: if record.key.is_type() { event } else { None },
            args,
            callback: &record.callback,
            context: record.context.as_ref(),
        };

        trace!(
            emitter = label,
            event = %record.key,
            listener = %record.callback.describe(),
            "Notifying listener"
        );
        report.invoked = report.invoked.saturating_add(1);

        if let Err(failure) = invoke(&delivery) {
            report.failed = report.failed.saturating_add(1);
            match failure {
                Failure::Error(error) => warn!(
                    emitter = label,
                    event = %record.key,
                    listener = %record.callback.describe(),
                    error = %format!("{error:#}"),
                    "Listener returned an error"
                ),
                Failure::Panic(message) => warn!(
                    emitter = label,
                    event = %record.key,
                    listener = %record.callback.describe(),
                    panic = %message,
                    "Listener panicked"
                ),
            }
        }
    }

    report
}

fn invoke(delivery: &Delivery<'_>) -> Result<(), Failure> {
    // Catch panics to prevent one listener from affecting the others.
    match panic::catch_unwind(AssertUnwindSafe(|| delivery.callback.call(delivery))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(Failure::Error(error)),
        Err(payload) => Err(Failure::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
