//! Per-emitter listener storage.
//!
//! The registry only ever holds active records. Deactivation and detachment
//! happen together under the lock, so a record that is still listed is
//! always active; dispatch snapshots can outlive the listing and recheck
//! [`ListenerRecord::is_active`] before each call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::key::EventKey;
use crate::listener::{Callback, Context, ListenerInfo, ListenerRecord};

/// Criteria for removing listeners.
///
/// - no key, callback, or context: every listener;
/// - `key` only: every listener for that key;
/// - `callback`: listeners with that callback whose context equals `context`
///   (so an absent context only matches listeners registered without one);
/// - `context` without `callback`: every listener registered with that context.
///
/// A `key` always narrows the selection to that key.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Selector<'a> {
    pub(crate) key: Option<&'a EventKey>,
    pub(crate) callback: Option<&'a Callback>,
    pub(crate) context: Option<&'a Context>,
}

impl Selector<'_> {
    fn matches(&self, record: &ListenerRecord) -> bool {
        if let Some(key) = self.key
            && record.key != *key
        {
            return false;
        }

        match (self.callback, self.context) {
            (Some(callback), context) => {
                record.callback.same(callback) && record.context.as_ref() == context
            },
            (None, Some(context)) => record.context.as_ref() == Some(context),
            (None, None) => true,
        }
    }
}

#[derive(Debug, Default)]
struct Channels {
    lists: HashMap<EventKey, Vec<Arc<ListenerRecord>>>,
    /// Keys in first-registration order.
    order: Vec<EventKey>,
}

impl Channels {
    fn prune(&mut self, key: &EventKey) {
        if self.lists.get(key).is_some_and(Vec::is_empty) {
            self.lists.remove(key);
            self.order.retain(|k| k != key);
        }
    }
}

/// Listener lists keyed by event, in registration order.
///
/// The lock only keeps each list consistent; it is never held across a
/// callback, so it imposes no order on concurrent dispatch passes.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    channels: Mutex<Channels>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        // Callbacks never run under this lock, so a poisoned guard still
        // holds consistent lists.
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record unless an active record already holds its triple.
    ///
    /// On conflict the existing record is left alone and the rejected one is
    /// handed back.
    pub(crate) fn insert(
        &self,
        record: ListenerRecord,
    ) -> Result<Arc<ListenerRecord>, ListenerRecord> {
        let mut channels = self.lock();

        if let Some(list) = channels.lists.get(&record.key)
            && list
                .iter()
                .any(|r| r.holds(&record.key, &record.callback, record.context.as_ref()))
        {
            return Err(record);
        }

        let record = Arc::new(record);
        if !channels.lists.contains_key(&record.key) {
            channels.order.push(record.key.clone());
        }
        channels
            .lists
            .entry(record.key.clone())
            .or_default()
            .push(Arc::clone(&record));

        Ok(record)
    }

    /// Ordered copy of the active records under `key`.
    pub(crate) fn snapshot(&self, key: &EventKey) -> Vec<Arc<ListenerRecord>> {
        self.lock().lists.get(key).cloned().unwrap_or_default()
    }

    /// Deactivate and detach `record`.
    ///
    /// Returns `false` if it was already inactive, in which case someone else
    /// owns the transition.
    pub(crate) fn retire(&self, record: &Arc<ListenerRecord>) -> bool {
        let mut channels = self.lock();
        if !record.deactivate() {
            return false;
        }

        if let Some(list) = channels.lists.get_mut(&record.key) {
            list.retain(|r| !Arc::ptr_eq(r, record));
        }
        channels.prune(&record.key);
        true
    }

    /// Deactivate and detach every record `selector` matches.
    ///
    /// Returns the removed records in removal order: keys in
    /// first-registration order, records in registration order within a key.
    pub(crate) fn remove(&self, selector: &Selector<'_>) -> Vec<Arc<ListenerRecord>> {
        let mut channels = self.lock();
        let keys: Vec<EventKey> = match selector.key {
            Some(key) => vec![key.clone()],
            None => channels.order.clone(),
        };

        let mut removed = Vec::new();
        for key in &keys {
            let Some(list) = channels.lists.get_mut(key) else {
                continue;
            };
            list.retain(|record| {
                if selector.matches(record) && record.deactivate() {
                    removed.push(Arc::clone(record));
                    false
                } else {
                    true
                }
            });
            channels.prune(key);
        }

        removed
    }

    /// Number of active records under `key`.
    pub(crate) fn count(&self, key: &EventKey) -> usize {
        self.lock().lists.get(key).map_or(0, Vec::len)
    }

    /// Number of active records across all keys.
    pub(crate) fn total(&self) -> usize {
        self.lock().lists.values().map(Vec::len).sum()
    }

    /// Keys with at least one active record, in first-registration order.
    pub(crate) fn keys(&self) -> Vec<EventKey> {
        self.lock().order.clone()
    }

    pub(crate) fn infos(&self, key: &EventKey) -> Vec<ListenerInfo> {
        self.lock()
            .lists
            .get(key)
            .map(|list| list.iter().map(|r| r.info()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::new(|_| Ok(()))
    }

    fn record(key: &str, callback: &Callback, context: Option<&Context>) -> ListenerRecord {
        ListenerRecord::new(EventKey::from(key), callback.clone(), context.cloned(), false)
    }

    #[test]
    fn test_insert_rejects_duplicate_triple() {
        let registry = Registry::new();
        let callback = noop();

        assert!(registry.insert(record("a", &callback, None)).is_ok());
        assert!(registry.insert(record("a", &callback, None)).is_err());
        assert_eq!(registry.count(&EventKey::from("a")), 1);
    }

    #[test]
    fn test_insert_allows_distinct_contexts() {
        let registry = Registry::new();
        let callback = noop();
        let first = Context::new(1_u8);
        let second = Context::new(1_u8);

        assert!(registry.insert(record("a", &callback, None)).is_ok());
        assert!(registry.insert(record("a", &callback, Some(&first))).is_ok());
        assert!(registry.insert(record("a", &callback, Some(&second))).is_ok());
        assert!(registry.insert(record("b", &callback, None)).is_ok());
        assert_eq!(registry.total(), 4);
    }

    #[test]
    fn test_reinsert_after_removal() {
        let registry = Registry::new();
        let callback = noop();
        let key = EventKey::from("a");

        registry.insert(record("a", &callback, None)).unwrap();
        let removed = registry.remove(&Selector {
            key: Some(&key),
            ..Selector::default()
        });
        assert_eq!(removed.len(), 1);
        assert!(!removed[0].is_active());
        assert!(registry.insert(record("a", &callback, None)).is_ok());
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry = Registry::new();
        let callbacks: Vec<Callback> = (0..3)
            .map(|i| Callback::named(format!("cb{i}"), |_| Ok(())))
            .collect();
        for callback in &callbacks {
            registry.insert(record("a", callback, None)).unwrap();
        }

        registry.remove(&Selector {
            callback: Some(&callbacks[1]),
            ..Selector::default()
        });

        let labels: Vec<_> = registry
            .snapshot(&EventKey::from("a"))
            .iter()
            .map(|r| r.callback.label().unwrap().to_owned())
            .collect();
        assert_eq!(labels, vec!["cb0", "cb2"]);
    }

    #[test]
    fn test_callback_without_context_spares_contextual_records() {
        let registry = Registry::new();
        let callback = noop();
        let context = Context::new("owner");
        let key = EventKey::from("a");

        registry.insert(record("a", &callback, Some(&context))).unwrap();
        let removed = registry.remove(&Selector {
            key: Some(&key),
            callback: Some(&callback),
            context: None,
        });
        assert!(removed.is_empty());

        let removed = registry.remove(&Selector {
            key: Some(&key),
            callback: Some(&callback),
            context: Some(&Context::new("owner")),
        });
        assert!(removed.is_empty());

        let removed = registry.remove(&Selector {
            key: Some(&key),
            callback: Some(&callback),
            context: Some(&context),
        });
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn test_remove_by_context_across_keys() {
        let registry = Registry::new();
        let context = Context::new("owner");
        let other = Context::new("other");

        registry.insert(record("a", &noop(), Some(&context))).unwrap();
        registry.insert(record("b", &noop(), Some(&other))).unwrap();
        registry.insert(record("c", &noop(), Some(&context))).unwrap();
        registry.insert(record("c", &noop(), None)).unwrap();

        let removed = registry.remove(&Selector {
            context: Some(&context),
            ..Selector::default()
        });
        let keys: Vec<_> = removed.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(registry.total(), 2);
        assert_eq!(registry.keys(), vec![EventKey::from("b"), EventKey::from("c")]);
    }

    #[test]
    fn test_remove_all_in_key_order() {
        let registry = Registry::new();
        registry.insert(record("y", &noop(), None)).unwrap();
        registry.insert(record("x", &noop(), None)).unwrap();
        registry.insert(record("y", &noop(), None)).unwrap();

        let removed = registry.remove(&Selector::default());
        let keys: Vec<_> = removed.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["y", "y", "x"]);
        assert_eq!(registry.total(), 0);
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn test_retire_is_one_shot() {
        let registry = Registry::new();
        let inserted = registry.insert(record("a", &noop(), None)).unwrap();

        assert!(registry.retire(&inserted));
        assert!(!registry.retire(&inserted));
        assert_eq!(registry.count(&EventKey::from("a")), 0);
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let registry = Registry::new();
        registry.insert(record("a", &noop(), None)).unwrap();

        let snapshot = registry.snapshot(&EventKey::from("a"));
        registry.remove(&Selector::default());

        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot[0].is_active());
    }
}
