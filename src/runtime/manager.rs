//! Component factory and owner of the active instance table.
//!
//! The manager is created once per host with [`ComponentManager::new`] and
//! shared as `Rc<ComponentManager>`. Components reach it through the weak
//! reference in their [`ComponentContext`], so dropping the host's handle
//! drops the manager even while components are alive.
//!
//! Store keys are unique per live instance. When a new instance of a kind
//! subscribes to a key another instance of that kind holds, the newer one
//! takes the key and the older one moves to `<key>.<instance id>`.
//!
//! A store write that reaches a component while it is borrowed (its own
//! event handler or `set_state` wrote the key) is queued and applied with the
//! latest value once the borrow is released.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::mpsc;

use serde_json::{json, Value};

use crate::config::EnvConfig;
use crate::core::component::{Component, ComponentOptions};
use crate::core::input_event::InputEvent;
use crate::core::surface::{Renderer, Surface};
use crate::error::{FrameworkError, RegistryError};
use crate::runtime::component_registry::{
    ActiveInstances, ComponentHandle, ComponentRegistry, Constructor, InstanceId,
};
use crate::runtime::context::ComponentContext;
use crate::runtime::requests::RequestTracker;
use crate::runtime::suggestions::{SuggestionResponse, SuggestionSource};
use crate::store::{keys, Store, StoreEvent, Subscription};

/// Upper bound on flush rounds, for components that keep rewriting their own
/// key from `set_state`.
const MAX_DEFERRED_ROUNDS: usize = 16;

/// Collaborators the host supplies when building a manager.
pub struct ManagerParts {
    pub store: Store,
    pub renderer: Rc<dyn Renderer>,
    pub surface: Rc<RefCell<dyn Surface>>,
    pub suggestions: Rc<dyn SuggestionSource>,
    pub config: EnvConfig,
}

struct DeferredUpdate {
    component: Weak<RefCell<Box<dyn Component>>>,
    key: String,
    value: Value,
}

/// Store updates waiting for a busy component.
#[derive(Clone, Default)]
struct DeferredUpdates(Rc<RefCell<Vec<DeferredUpdate>>>);

impl DeferredUpdates {
    /// Queue `value` for `component`, replacing an older value for the same key.
    fn defer(&self, component: &ComponentHandle, key: &str, value: Value) {
        let component = Rc::downgrade(component);
        let mut pending = self.0.borrow_mut();
        if let Some(update) = pending
            .iter_mut()
            .find(|update| update.key == key && Weak::ptr_eq(&update.component, &component))
        {
            update.value = value;
            return;
        }
        pending.push(DeferredUpdate {
            component,
            key: key.to_string(),
            value,
        });
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Apply queued updates to components that are free again. Updates for
    /// components still borrowed further up the stack stay queued.
    fn flush(&self) {
        for _ in 0..MAX_DEFERRED_ROUNDS {
            let pending = std::mem::take(&mut *self.0.borrow_mut());
            if pending.is_empty() {
                return;
            }
            let mut applied = 0;
            for update in pending {
                let Some(component) = update.component.upgrade() else {
                    continue;
                };
                let Ok(mut borrowed) = component.try_borrow_mut() else {
                    self.0.borrow_mut().push(update);
                    continue;
                };
                tracing::trace!(key = %update.key, "applying deferred store update");
                borrowed.set_state(update.value);
                applied += 1;
            }
            if applied == 0 {
                return;
            }
        }
        tracing::warn!(
            pending = self.len(),
            "deferred store updates keep re-triggering; leaving the rest queued"
        );
    }
}

pub struct ComponentManager {
    registry: RefCell<ComponentRegistry>,
    active: RefCell<ActiveInstances>,
    context: ComponentContext,
    responses: mpsc::Receiver<SuggestionResponse>,
    deferred: DeferredUpdates,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("registry", &self.registry.borrow())
            .field("active", &self.active.borrow().len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl ComponentManager {
    pub fn new(parts: ManagerParts) -> Rc<Self> {
        let (responses_tx, responses_rx) = mpsc::channel();
        Rc::new_cyclic(|manager| Self {
            registry: RefCell::new(ComponentRegistry::new()),
            active: RefCell::new(ActiveInstances::new()),
            context: ComponentContext {
                store: parts.store,
                renderer: parts.renderer,
                surface: parts.surface,
                suggestions: parts.suggestions,
                responses: responses_tx,
                requests: RequestTracker::new(),
                config: parts.config,
                manager: manager.clone(),
            },
            responses: responses_rx,
            deferred: DeferredUpdates::default(),
        })
    }

    pub fn store(&self) -> &Store {
        &self.context.store
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn register(&self, kind: &str, ctor: Constructor) -> Result<(), RegistryError> {
        self.registry.borrow_mut().register(kind, ctor)
    }

    pub fn register_override(&self, kind: &str, ctor: Constructor) -> Option<Constructor> {
        self.registry.borrow_mut().register_override(kind, ctor)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.registry.borrow().contains(kind)
    }

    /// Build, initialize, and record a component of `kind`.
    ///
    /// On error nothing is recorded. An existing instance with the same id is
    /// replaced and torn down.
    pub fn create(
        &self,
        kind: &str,
        options: ComponentOptions,
    ) -> Result<ComponentHandle, FrameworkError> {
        let ctor = self
            .registry
            .borrow()
            .get(kind)
            .ok_or_else(|| RegistryError::Unregistered(kind.to_string()))?;

        let id = options
            .instance_id
            .clone()
            .unwrap_or_else(|| InstanceId::generate(kind));
        let options = ComponentOptions {
            instance_id: Some(id.clone()),
            ..options
        };

        let mut component = ctor(options, self.context.clone())?;
        component.init()?;
        component.mount()?;

        let module_id = component.module_id().map(str::to_string);
        let handle: ComponentHandle = Rc::new(RefCell::new(component));
        if let Some(key) = module_id.as_deref() {
            self.release_key(kind, key, &id);
        }
        let subscription = module_id
            .as_deref()
            .map(|key| self.subscribe(key, &handle));

        let replaced = self.active.borrow_mut().insert(
            id.clone(),
            kind,
            Rc::clone(&handle),
            module_id.clone(),
            subscription,
        );
        if let Some(previous) = replaced {
            tracing::debug!(id = %id, kind = %previous.kind, "replacing live instance");
            drop(previous.subscription);
            teardown(&previous.handle, &id);
        }

        tracing::debug!(id = %id, kind, module = module_id.as_deref(), "component created");

        if let Some(value) = module_id.as_deref().and_then(|key| self.context.store.get(key)) {
            handle.borrow_mut().set_state(value);
            self.deferred.flush();
        }
        Ok(handle)
    }

    /// Most recently created live instance of `kind`.
    pub fn get_active(&self, kind: &str) -> Option<ComponentHandle> {
        self.active.borrow().latest(kind)
    }

    pub fn get_instance(&self, id: &InstanceId) -> Option<ComponentHandle> {
        self.active.borrow().get(id)
    }

    pub fn instances_of(&self, kind: &str) -> Vec<InstanceId> {
        self.active.borrow().ids_of_kind(kind)
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    /// Whether the instance currently holds a live store subscription.
    pub fn is_subscribed(&self, id: &InstanceId) -> bool {
        self.active.borrow().is_subscribed(id)
    }

    /// Store key the instance is subscribed to, if any.
    pub fn module_key(&self, id: &InstanceId) -> Option<String> {
        self.active.borrow().module_key(id)
    }

    /// Tear down `id` and release its subscription. Returns false if no such
    /// instance is live.
    pub fn destroy(&self, id: &InstanceId) -> bool {
        let removed = self.active.borrow_mut().remove(id);
        let Some(entry) = removed else {
            return false;
        };
        drop(entry.subscription);
        teardown(&entry.handle, id);
        tracing::debug!(id = %id, kind = %entry.kind, "component destroyed");
        true
    }

    /// Deliver a host event to one instance. Returns false if it is not live.
    pub fn dispatch_event(&self, id: &InstanceId, event: &InputEvent) -> bool {
        let Some(handle) = self.get_instance(id) else {
            tracing::debug!(id = %id, ?event, "event for unknown instance dropped");
            return false;
        };
        let Ok(mut component) = handle.try_borrow_mut() else {
            tracing::warn!(id = %id, ?event, "component busy; event dropped");
            return false;
        };
        component.handle_event(event);
        drop(component);
        self.deferred.flush();
        true
    }

    /// Apply every suggestion response received so far. Only the latest
    /// response per key reaches the store. Returns how many were applied.
    pub fn pump_responses(&self) -> usize {
        let mut applied = 0;
        while let Ok(response) = self.responses.try_recv() {
            let SuggestionResponse { key, seq, outcome } = response;
            if !self.context.requests.is_latest(&key, seq) {
                tracing::debug!(key = %key, seq, "stale suggestion response dropped");
                continue;
            }
            match outcome {
                Ok(sections) => {
                    self.context.store.set(key, json!({ "sections": sections }));
                    applied += 1;
                }
                Err(error) => {
                    tracing::warn!(key = %key, seq, %error, "suggestion request failed");
                }
            }
        }
        applied
    }

    /// Hand `key` over from the instance of `kind` holding it to `newcomer`.
    /// The previous holder keeps working on `<key>.<holder id>`, and requests
    /// it left in flight on `key` are invalidated.
    fn release_key(&self, kind: &str, key: &str, newcomer: &InstanceId) {
        let holder = self.active.borrow().key_holder(kind, key);
        let Some(holder) = holder.filter(|holder| holder != newcomer) else {
            return;
        };
        let Some(handle) = self.get_instance(&holder) else {
            return;
        };
        self.context.requests.invalidate(key);

        let scoped = keys::scoped(key, Some(holder.as_str()));
        let moved = match handle.try_borrow_mut() {
            Ok(mut component) => {
                component.core_mut().set_module_id(Some(scoped.clone()));
                true
            }
            Err(_) => false,
        };
        if !moved {
            tracing::warn!(id = %holder, key, "component busy; unsubscribed without a new key");
            let released = self.active.borrow_mut().unbind(&holder);
            drop(released);
            return;
        }

        let subscription = self.subscribe(&scoped, &handle);
        let previous = self.active.borrow_mut().rebind(&holder, scoped.clone(), subscription);
        drop(previous);
        tracing::debug!(id = %holder, from = key, to = %scoped, by = %newcomer, "store key handed over");
    }

    fn subscribe(&self, key: &str, handle: &ComponentHandle) -> Subscription {
        let component = Rc::downgrade(handle);
        let deferred = self.deferred.clone();
        let watched = key.to_string();
        self.context
            .store
            .on(StoreEvent::Update, key, move |value| {
                let Some(component) = component.upgrade() else {
                    return;
                };
                let applied = match component.try_borrow_mut() {
                    Ok(mut borrowed) => {
                        borrowed.set_state(value.clone());
                        true
                    }
                    Err(_) => false,
                };
                if applied {
                    deferred.flush();
                } else {
                    tracing::debug!(key = %watched, "component busy; store update deferred");
                    deferred.defer(&component, &watched, value.clone());
                }
            })
    }
}

fn teardown(handle: &ComponentHandle, id: &InstanceId) {
    let torn_down = match handle.try_borrow_mut() {
        Ok(mut component) => {
            component.teardown();
            true
        }
        Err(_) => false,
    };
    if !torn_down {
        tracing::warn!(id = %id, "component busy during teardown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::component::{Component, ComponentCore, Lifecycle};
    use crate::core::surface::{HeadlessSurface, LineRenderer};
    use crate::runtime::component_registry::constructor;
    use crate::runtime::suggestions::NoSuggestions;
    use serde_json::{json, Value};

    struct Stub {
        core: ComponentCore,
    }

    impl Component for Stub {
        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
    }

    /// Answers `{ "step": 1 }` by writing `{ "step": 2 }` to its own key.
    struct Echo {
        core: ComponentCore,
    }

    impl Component for Echo {
        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }

        fn set_state(&mut self, data: Value) {
            if data.get("step") == Some(&json!(1)) {
                self.core.context().store.set("echo-key", json!({ "step": 2 }));
            }
            self.core.set_state(data);
        }
    }

    fn stub() -> Constructor {
        constructor(|options, context| {
            let module = options.config_str("module").map(str::to_string);
            let core = ComponentCore::new("Stub", "stub", &options, context).with_module_id(module);
            Ok(Box::new(Stub { core }))
        })
    }

    fn manager() -> Rc<ComponentManager> {
        let surface: Rc<RefCell<dyn Surface>> =
            Rc::new(RefCell::new(HeadlessSurface::new().with_element("#stub")));
        let manager = ComponentManager::new(ManagerParts {
            store: Store::new(),
            renderer: Rc::new(LineRenderer::default()),
            surface,
            suggestions: Rc::new(NoSuggestions),
            config: EnvConfig::default(),
        });
        manager.register("Stub", stub()).expect("register stub");
        manager
    }

    #[test]
    fn unregistered_kind_records_nothing() {
        let manager = manager();
        let err = manager
            .create("Missing", ComponentOptions::new())
            .expect_err("unregistered");
        assert_eq!(
            err,
            FrameworkError::Registry(RegistryError::Unregistered("Missing".to_string()))
        );
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn subscribed_component_receives_store_writes() {
        let manager = manager();
        let handle = manager
            .create(
                "Stub",
                ComponentOptions::new()
                    .with_id("p")
                    .with_container("#stub")
                    .with_option("module", json!("stub-key")),
            )
            .expect("create");
        assert_eq!(handle.borrow().lifecycle(), Lifecycle::Initialized);
        assert_eq!(manager.store().subscriber_count("stub-key"), 1);

        manager.store().set("stub-key", json!({ "value": 1 }));
        assert_eq!(handle.borrow().state(), &json!({ "value": 1 }));
        assert_eq!(handle.borrow().lifecycle(), Lifecycle::Mounted);
    }

    #[test]
    fn destroy_releases_subscription() {
        let manager = manager();
        let id = InstanceId::from("p");
        let handle = manager
            .create(
                "Stub",
                ComponentOptions::new()
                    .with_id(id.clone())
                    .with_option("module", json!("stub-key")),
            )
            .expect("create");
        assert!(manager.is_subscribed(&id));
        assert!(manager.destroy(&id));
        assert!(!manager.destroy(&id));
        assert_eq!(manager.store().subscriber_count("stub-key"), 0);
        assert_eq!(handle.borrow().lifecycle(), Lifecycle::Unmounted);

        manager.store().set("stub-key", json!({ "value": 2 }));
        assert_eq!(handle.borrow().state(), &json!({}));
    }

    #[test]
    fn existing_store_value_is_applied_on_create() {
        let manager = manager();
        manager.store().set("stub-key", json!({ "ready": true }));
        let handle = manager
            .create("Stub", ComponentOptions::new().with_option("module", json!("stub-key")))
            .expect("create");
        assert_eq!(handle.borrow().state(), &json!({ "ready": true }));
    }

    #[test]
    fn pump_applies_only_latest_response() {
        let manager = manager();
        let requests = &manager.context().requests;
        let stale = requests.issue("autocomplete");
        let latest = requests.issue("autocomplete");
        let tx = manager.context().responses.clone();
        for seq in [latest, stale] {
            tx.send(SuggestionResponse {
                key: "autocomplete".to_string(),
                seq,
                outcome: Ok(Vec::new()),
            })
            .expect("send");
        }
        assert_eq!(manager.pump_responses(), 1);
        assert_eq!(
            manager.store().get("autocomplete"),
            Some(json!({ "sections": Value::Array(Vec::new()) }))
        );
    }

    #[test]
    fn handle_debug_names_kind_and_id() {
        let manager = manager();
        let handle = manager
            .create("Stub", ComponentOptions::new().with_id("p"))
            .expect("create");
        let printed = format!("{handle:?}");
        assert!(printed.contains(r#"kind: "Stub""#), "{printed}");
        assert!(printed.contains(r#"InstanceId("p")"#), "{printed}");
    }

    #[test]
    fn write_to_own_key_during_set_state_is_applied_afterwards() {
        let manager = manager();
        manager
            .register(
                "Echo",
                constructor(|options, context| {
                    let core = ComponentCore::new("Echo", "echo", &options, context)
                        .with_module_id(Some("echo-key".to_string()));
                    Ok(Box::new(Echo { core }))
                }),
            )
            .expect("register echo");
        let handle = manager
            .create("Echo", ComponentOptions::new())
            .expect("create");

        manager.store().set("echo-key", json!({ "step": 1 }));

        assert_eq!(manager.store().get("echo-key"), Some(json!({ "step": 2 })));
        assert_eq!(handle.borrow().state(), &json!({ "step": 2 }));
        assert_eq!(manager.deferred.len(), 0);
    }
}
