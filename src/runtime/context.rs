//! Shared collaborators handed to every component at construction.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::EnvConfig;
use crate::core::surface::{Renderer, Surface};
use crate::runtime::manager::ComponentManager;
use crate::runtime::requests::RequestTracker;
use crate::runtime::suggestions::{ResponseSender, SuggestionSource};
use crate::store::Store;

#[derive(Clone)]
pub struct ComponentContext {
    pub store: Store,
    pub renderer: Rc<dyn Renderer>,
    pub surface: Rc<RefCell<dyn Surface>>,
    pub suggestions: Rc<dyn SuggestionSource>,
    pub responses: ResponseSender,
    pub requests: RequestTracker,
    pub config: EnvConfig,
    pub(crate) manager: Weak<ComponentManager>,
}

impl fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("manager_alive", &(self.manager.strong_count() > 0))
            .finish()
    }
}

impl ComponentContext {
    /// The manager that created this component, unless it has been dropped.
    pub fn manager(&self) -> Option<Rc<ComponentManager>> {
        self.manager.upgrade()
    }
}
