//! Component registry, instance identifiers, and the active instance table.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::component::{Component, ComponentOptions};
use crate::error::{FrameworkError, RegistryError};
use crate::runtime::context::ComponentContext;
use crate::store::Subscription;

/// Identifier for a live component instance.
///
/// Callers may supply their own (`"header-search"`); otherwise the manager
/// generates `<kind>#<n>`. Generated ids are never reused within a process.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InstanceId(String);

static NEXT_GENERATED_ID: AtomicU64 = AtomicU64::new(0);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate(kind: &str) -> Self {
        let n = NEXT_GENERATED_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("{kind}#{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub type ComponentHandle = Rc<RefCell<Box<dyn Component>>>;

/// Builds a component from caller options and the shared context.
pub type Constructor =
    Rc<dyn Fn(ComponentOptions, ComponentContext) -> Result<Box<dyn Component>, FrameworkError>>;

/// Wrap a closure as a [`Constructor`].
pub fn constructor<F>(build: F) -> Constructor
where
    F: Fn(ComponentOptions, ComponentContext) -> Result<Box<dyn Component>, FrameworkError>
        + 'static,
{
    Rc::new(build)
}

/// Maps component kinds to their constructors.
#[derive(Default)]
pub struct ComponentRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kind`. Fails if the kind is already registered; replacing a
    /// constructor goes through [`ComponentRegistry::register_override`].
    pub fn register(&mut self, kind: &str, ctor: Constructor) -> Result<(), RegistryError> {
        if self.constructors.contains_key(kind) {
            return Err(RegistryError::Duplicate(kind.to_string()));
        }
        self.constructors.insert(kind.to_string(), ctor);
        tracing::debug!(kind, "component registered");
        Ok(())
    }

    /// Replace (or add) the constructor for `kind`, returning the previous one.
    pub fn register_override(&mut self, kind: &str, ctor: Constructor) -> Option<Constructor> {
        let previous = self.constructors.insert(kind.to_string(), ctor);
        tracing::info!(kind, replaced = previous.is_some(), "component constructor overridden");
        previous
    }

    pub fn get(&self, kind: &str) -> Option<Constructor> {
        self.constructors.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

pub(crate) struct ActiveEntry {
    pub(crate) kind: String,
    pub(crate) handle: ComponentHandle,
    pub(crate) module_key: Option<String>,
    pub(crate) subscription: Option<Subscription>,
    created: u64,
}

/// Live instances keyed by instance id, plus creation order per kind.
#[derive(Default)]
pub struct ActiveInstances {
    entries: HashMap<InstanceId, ActiveEntry>,
    next_created: u64,
}

impl ActiveInstances {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        id: InstanceId,
        kind: &str,
        handle: ComponentHandle,
        module_key: Option<String>,
        subscription: Option<Subscription>,
    ) -> Option<ActiveEntry> {
        let created = self.next_created;
        self.next_created += 1;
        self.entries.insert(
            id,
            ActiveEntry {
                kind: kind.to_string(),
                handle,
                module_key,
                subscription,
                created,
            },
        )
    }

    pub(crate) fn remove(&mut self, id: &InstanceId) -> Option<ActiveEntry> {
        self.entries.remove(id)
    }

    /// Live instance of `kind` currently subscribed to `key`.
    pub(crate) fn key_holder(&self, kind: &str, key: &str) -> Option<InstanceId> {
        self.entries
            .iter()
            .find(|(_, entry)| {
                entry.kind == kind
                    && entry.module_key.as_deref() == Some(key)
                    && entry.subscription.as_ref().is_some_and(Subscription::is_active)
            })
            .map(|(id, _)| id.clone())
    }

    /// Point `id` at a new store key, returning the subscription it held.
    pub(crate) fn rebind(
        &mut self,
        id: &InstanceId,
        key: String,
        subscription: Subscription,
    ) -> Option<Subscription> {
        let entry = self.entries.get_mut(id)?;
        entry.module_key = Some(key);
        entry.subscription.replace(subscription)
    }

    /// Drop `id`'s store key, returning the subscription it held.
    pub(crate) fn unbind(&mut self, id: &InstanceId) -> Option<Subscription> {
        let entry = self.entries.get_mut(id)?;
        entry.module_key = None;
        entry.subscription.take()
    }

    /// Store key `id` listens to, if any.
    pub fn module_key(&self, id: &InstanceId) -> Option<String> {
        self.entries.get(id).and_then(|entry| entry.module_key.clone())
    }

    pub fn get(&self, id: &InstanceId) -> Option<ComponentHandle> {
        self.entries.get(id).map(|entry| Rc::clone(&entry.handle))
    }

    /// Most recently created live instance of `kind`.
    pub fn latest(&self, kind: &str) -> Option<ComponentHandle> {
        self.entries
            .values()
            .filter(|entry| entry.kind == kind)
            .max_by_key(|entry| entry.created)
            .map(|entry| Rc::clone(&entry.handle))
    }

    pub fn ids_of_kind(&self, kind: &str) -> Vec<InstanceId> {
        let mut matching: Vec<(&InstanceId, u64)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.kind == kind)
            .map(|(id, entry)| (id, entry.created))
            .collect();
        matching.sort_by_key(|(_, created)| *created);
        matching.into_iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_subscribed(&self, id: &InstanceId) -> bool {
        self.entries
            .get(id)
            .and_then(|entry| entry.subscription.as_ref())
            .is_some_and(Subscription::is_active)
    }
}
