//! Component contract and the shared base behaviour every widget embeds.
//!
//! Lifecycle, in order and without skipping:
//! `Constructed → Initialized → Mounted → Updating* → Unmounted`.
//!
//! Widgets hold a [`ComponentCore`] and implement [`Component`] by exposing it;
//! the trait's default methods run the base steps (state merge, deferred
//! mounting, repaint, child creation, teardown). Overrides that change
//! `set_state` must pass the merged payload through
//! [`ComponentCore::set_state`] so base fields are not lost.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::core::input_event::InputEvent;
use crate::core::model::Selection;
use crate::core::surface::selector_path;
use crate::error::{ConfigurationError, FrameworkError, RegistryError};
use crate::runtime::component_registry::{ComponentHandle, InstanceId};
use crate::runtime::context::ComponentContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    Constructed,
    Initialized,
    Mounted,
    Updating,
    Unmounted,
}

impl Lifecycle {
    pub fn can_advance_to(self, next: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, next),
            (Constructed, Initialized)
                | (Initialized, Mounted)
                | (Mounted, Updating)
                | (Updating, Updating)
                | (Constructed | Initialized | Mounted | Updating, Unmounted)
        )
    }

    pub fn is_mounted(self) -> bool {
        matches!(self, Lifecycle::Mounted | Lifecycle::Updating)
    }
}

pub type SubmitHandler = Rc<dyn Fn(&Selection)>;

/// Reference to the component that created a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub id: InstanceId,
    pub name: String,
    pub container: Option<String>,
}

/// Caller-supplied construction options.
#[derive(Clone, Default)]
pub struct ComponentOptions {
    pub instance_id: Option<InstanceId>,
    pub name: Option<String>,
    pub container: Option<String>,
    pub parent: Option<ParentRef>,
    pub config: Map<String, Value>,
    pub on_submit: Option<SubmitHandler>,
}

impl fmt::Debug for ComponentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentOptions")
            .field("instance_id", &self.instance_id)
            .field("name", &self.name)
            .field("container", &self.container)
            .field("parent", &self.parent)
            .field("config", &self.config)
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<InstanceId>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Merge the fields of a JSON object into `config`. Non-objects are ignored.
    pub fn with_config(mut self, config: Value) -> Self {
        if let Value::Object(map) = config {
            self.config.extend(map);
        }
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn on_submit(mut self, handler: impl Fn(&Selection) + 'static) -> Self {
        self.on_submit = Some(Rc::new(handler));
        self
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn config_bool(&self, key: &str) -> bool {
        self.config.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn config_usize(&self, key: &str) -> Option<usize> {
        self.config
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| usize::try_from(value).ok())
    }
}

/// Shallow-merge `extra` into `base`. A non-object `base` is replaced by an
/// empty object first; a non-object `extra` is stored under `"value"`.
pub fn merge_state(base: Value, extra: Value) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    match extra {
        Value::Object(map) => merged.extend(map),
        Value::Null => {}
        other => {
            merged.insert("value".to_string(), other);
        }
    }
    Value::Object(merged)
}

pub fn is_empty_state(state: &Value) -> bool {
    match state {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Base state and wiring shared by every component.
pub struct ComponentCore {
    kind: String,
    id: InstanceId,
    name: String,
    parent: Option<ParentRef>,
    module_id: Option<String>,
    container: Option<String>,
    template: &'static str,
    state: Value,
    lifecycle: Lifecycle,
    children: Vec<ComponentHandle>,
    context: ComponentContext,
}

impl fmt::Debug for ComponentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCore")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("module_id", &self.module_id)
            .field("container", &self.container)
            .field("lifecycle", &self.lifecycle)
            .field("children", &self.children.len())
            .finish()
    }
}

impl ComponentCore {
    pub fn new(
        kind: &str,
        template: &'static str,
        options: &ComponentOptions,
        context: ComponentContext,
    ) -> Self {
        let id = options
            .instance_id
            .clone()
            .unwrap_or_else(|| InstanceId::generate(kind));
        Self {
            kind: kind.to_string(),
            name: options.name.clone().unwrap_or_else(|| kind.to_string()),
            id,
            parent: options.parent.clone(),
            module_id: None,
            container: options.container.clone(),
            template,
            state: Value::Object(Map::new()),
            lifecycle: Lifecycle::Constructed,
            children: Vec::new(),
            context,
        }
    }

    pub fn with_module_id(mut self, module_id: Option<String>) -> Self {
        self.module_id = module_id;
        self
    }

    /// Move the instance to another store key. Used by the manager when a
    /// newer instance of the same kind claims the current one.
    pub fn set_module_id(&mut self, module_id: Option<String>) {
        self.module_id = module_id;
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn module_id(&self) -> Option<&str> {
        self.module_id.as_deref()
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn children(&self) -> &[ComponentHandle] {
        &self.children
    }

    pub fn as_parent(&self) -> ParentRef {
        ParentRef {
            id: self.id.clone(),
            name: self.name.clone(),
            container: self.container.clone(),
        }
    }

    /// Resolve `selector` inside the parent's container, falling back to the
    /// surface root.
    pub fn scoped_selector(&self, selector: &str) -> String {
        let scope = self
            .parent
            .as_ref()
            .and_then(|parent| parent.container.as_deref());
        selector_path(scope, selector)
    }

    pub fn advance(&mut self, next: Lifecycle) -> Result<(), FrameworkError> {
        if !self.lifecycle.can_advance_to(next) {
            return Err(FrameworkError::Lifecycle {
                component: self.name.clone(),
                from: self.lifecycle,
                to: next,
            });
        }
        self.lifecycle = next;
        Ok(())
    }

    pub fn init(&mut self) -> Result<(), FrameworkError> {
        self.advance(Lifecycle::Initialized)
    }

    /// Attach to the surface. Returns `Ok(false)` when mounting is deferred
    /// because the component has no state yet.
    pub fn mount(&mut self) -> Result<bool, FrameworkError> {
        if self.lifecycle.is_mounted() {
            self.repaint();
            return Ok(true);
        }
        if is_empty_state(&self.state) {
            tracing::trace!(component = %self.name, "mount deferred until state arrives");
            return Ok(false);
        }
        if let Some(container) = self.container.as_deref() {
            if !self.context.surface.borrow().contains(container) {
                return Err(ConfigurationError::MissingElement {
                    component: self.name.clone(),
                    selector: container.to_string(),
                }
                .into());
            }
        }
        self.advance(Lifecycle::Mounted)?;
        self.repaint();
        Ok(true)
    }

    /// Replace the state with `data` and re-render.
    pub fn set_state(&mut self, data: Value) {
        if self.lifecycle == Lifecycle::Unmounted {
            tracing::debug!(component = %self.name, "state ignored after teardown");
            return;
        }
        self.state = merge_state(Value::Null, data);

        match self.lifecycle {
            Lifecycle::Constructed => {}
            Lifecycle::Initialized => {
                if let Err(error) = self.mount() {
                    tracing::warn!(component = %self.name, %error, "mount failed");
                }
            }
            Lifecycle::Mounted | Lifecycle::Updating => {
                self.lifecycle = Lifecycle::Updating;
                self.repaint();
            }
            Lifecycle::Unmounted => {}
        }
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.context.renderer.render(self.template, &self.state)
    }

    fn repaint(&self) {
        let Some(container) = self.container.as_deref() else {
            return;
        };
        let lines = self.render_lines();
        if !self
            .context
            .surface
            .borrow_mut()
            .replace_content(container, lines)
        {
            tracing::warn!(component = %self.name, container, "container disappeared from surface");
        }
    }

    /// Create a subordinate component of `kind` and hand it `data` as state.
    pub fn add_child(&mut self, data: Value, kind: &str) -> Result<ComponentHandle, FrameworkError> {
        let manager = self
            .context
            .manager()
            .ok_or_else(|| RegistryError::ManagerDropped(kind.to_string()))?;
        let ordinal = self.children.len();
        let options = ComponentOptions::new()
            .with_id(format!("{}/{kind}#{ordinal}", self.id))
            .with_name(format!("{}.{kind}", self.name))
            .with_parent(self.as_parent());
        let child = manager.create(kind, options)?;
        child.borrow_mut().set_state(data);
        self.children.push(Rc::clone(&child));
        Ok(child)
    }

    /// Destroy every child through the manager that created it.
    pub fn clear_children(&mut self) {
        let children = std::mem::take(&mut self.children);
        let Some(manager) = self.context.manager() else {
            return;
        };
        for child in children {
            let id = child.borrow().id().clone();
            manager.destroy(&id);
        }
    }

    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        self.clear_children();
        if self.lifecycle.is_mounted() {
            if let Some(container) = self.container.as_deref() {
                self.context
                    .surface
                    .borrow_mut()
                    .replace_content(container, Vec::new());
            }
        }
        self.lifecycle = Lifecycle::Unmounted;
    }
}

/// Behavioural interface every widget instance satisfies.
pub trait Component {
    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    fn kind(&self) -> &str {
        self.core().kind()
    }

    fn id(&self) -> &InstanceId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    /// Store key this instance listens to, if any.
    fn module_id(&self) -> Option<&str> {
        self.core().module_id()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.core().lifecycle()
    }

    fn state(&self) -> &Value {
        self.core().state()
    }

    /// Resolve statically required children and surface hooks.
    fn init(&mut self) -> Result<(), FrameworkError> {
        self.core_mut().init()
    }

    fn mount(&mut self) -> Result<bool, FrameworkError> {
        self.core_mut().mount()
    }

    fn set_state(&mut self, data: Value) {
        self.core_mut().set_state(data);
    }

    fn handle_event(&mut self, _event: &InputEvent) {}

    fn render(&self) -> Vec<String> {
        self.core().render_lines()
    }

    fn add_child(&mut self, data: Value, kind: &str) -> Result<ComponentHandle, FrameworkError> {
        self.core_mut().add_child(data, kind)
    }

    fn teardown(&mut self) {
        self.core_mut().teardown();
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind())
            .field("id", self.id())
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lifecycle_rejects_skips() {
        use Lifecycle::*;
        assert!(Constructed.can_advance_to(Initialized));
        assert!(!Constructed.can_advance_to(Mounted));
        assert!(!Initialized.can_advance_to(Updating));
        assert!(Updating.can_advance_to(Updating));
        assert!(Initialized.can_advance_to(Unmounted));
        assert!(!Unmounted.can_advance_to(Initialized));
        assert!(!Mounted.can_advance_to(Initialized));
    }

    #[test]
    fn merge_state_overlays_derived_fields() {
        let merged = merge_state(json!({ "a": 1, "b": 2 }), json!({ "b": 3, "c": 4 }));
        assert_eq!(merged, json!({ "a": 1, "b": 3, "c": 4 }));
        assert_eq!(merge_state(Value::Null, json!(5)), json!({ "value": 5 }));
        assert_eq!(merge_state(json!("x"), Value::Null), json!({ "value": "x" }));
    }

    #[test]
    fn empty_state_detection() {
        assert!(is_empty_state(&Value::Null));
        assert!(is_empty_state(&json!({})));
        assert!(!is_empty_state(&json!({ "results": [] })));
        assert!(!is_empty_state(&json!(0)));
    }

    #[test]
    fn options_read_trimmed_config() {
        let options = ComponentOptions::new().with_config(json!({
            "barKey": "  main ",
            "empty": " ",
            "limit": 3,
            "filterSearch": true
        }));
        assert_eq!(options.config_str("barKey"), Some("main"));
        assert_eq!(options.config_str("empty"), None);
        assert_eq!(options.config_usize("limit"), Some(3));
        assert!(options.config_bool("filterSearch"));
        assert!(!options.config_bool("missing"));
    }
}
