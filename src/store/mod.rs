//! Shared observable key/value store.
//!
//! Single source of truth for cross-component state. Keys are dot-scoped
//! strings (`autocomplete.<barKey>`, `query.<name>`). Writes are
//! last-writer-wins and notify subscribers synchronously, in registration
//! order, before `set` returns.

pub mod keys;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

/// Callback invoked with the value written to (or removed from) a key.
pub type StoreCallback = Rc<dyn Fn(&Value)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    Update,
    Delete,
}

struct Listener {
    id: u64,
    event: StoreEvent,
    key: String,
    callback: StoreCallback,
}

#[derive(Default)]
struct StoreInner {
    entries: BTreeMap<String, Value>,
    listeners: Vec<Listener>,
    next_listener_id: u64,
}

impl StoreInner {
    fn callbacks_for(&self, event: StoreEvent, key: &str) -> Vec<StoreCallback> {
        self.listeners
            .iter()
            .filter(|listener| listener.event == event && listener.key == key)
            .map(|listener| Rc::clone(&listener.callback))
            .collect()
    }
}

/// Cheaply cloneable handle; clones share the same entries and listeners.
#[derive(Clone, Default)]
pub struct Store {
    inner: Rc<RefCell<StoreInner>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("keys", &inner.entries.keys().collect::<Vec<_>>())
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Values stored at `prefix` itself or anywhere beneath `prefix.`, in key order.
    /// An empty prefix returns every value.
    pub fn get_all(&self, prefix: &str) -> Vec<Value> {
        let inner = self.inner.borrow();
        if prefix.is_empty() {
            return inner.entries.values().cloned().collect();
        }
        let scoped = format!("{prefix}.");
        inner
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| key.as_str() == prefix || key.starts_with(&scoped))
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// Write `value` under `key` and notify every `Update` subscriber of `key`.
    ///
    /// The subscriber list is captured before dispatch: callbacks may freely
    /// read or write the store, and subscriptions added during dispatch only
    /// see later writes.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.entries.insert(key.clone(), value.clone());
            inner.callbacks_for(StoreEvent::Update, &key)
        };
        tracing::trace!(key = %key, subscribers = callbacks.len(), "store set");
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Remove `key`, notifying `Delete` subscribers with the removed value.
    pub fn delete(&self, key: &str) -> Option<Value> {
        let (removed, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let removed = inner.entries.remove(key);
            let callbacks = if removed.is_some() {
                inner.callbacks_for(StoreEvent::Delete, key)
            } else {
                Vec::new()
            };
            (removed, callbacks)
        };
        if let Some(value) = removed.as_ref() {
            tracing::trace!(key = %key, subscribers = callbacks.len(), "store delete");
            for callback in callbacks {
                callback(value);
            }
        }
        removed
    }

    /// Subscribe `callback` to `event` on `key`.
    ///
    /// The returned handle releases the subscription when dropped.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn on<F>(&self, event: StoreEvent, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + 'static,
    {
        let key = key.into();
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push(Listener {
            id,
            event,
            key: key.clone(),
            callback: Rc::new(callback),
        });
        Subscription {
            store: Rc::downgrade(&self.inner),
            id: Some(id),
            key,
        }
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.key == key)
            .count()
    }

    fn remove_listener(inner: &Rc<RefCell<StoreInner>>, id: u64) {
        inner
            .borrow_mut()
            .listeners
            .retain(|listener| listener.id != id);
    }
}

/// Disposable handle for a store subscription.
pub struct Subscription {
    store: Weak<RefCell<StoreInner>>,
    id: Option<u64>,
    key: String,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.store.strong_count() > 0
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the callback registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.id = None;
    }

    fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(inner) = self.store.upgrade() {
            Store::remove_listener(&inner, id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
