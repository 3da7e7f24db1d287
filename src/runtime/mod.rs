//! Component orchestration: registry, manager, request sequencing, and
//! suggestion delivery.

pub mod component_registry;
pub mod context;
pub mod manager;
pub mod requests;
pub mod suggestions;

pub use component_registry::{constructor, ComponentHandle, ComponentRegistry, Constructor, InstanceId};
pub use context::ComponentContext;
pub use manager::{ComponentManager, ManagerParts};
pub use requests::RequestTracker;
pub use suggestions::{
    NoSuggestions, ResponseSender, SuggestionKind, SuggestionRequest, SuggestionResponse,
    SuggestionSource,
};
