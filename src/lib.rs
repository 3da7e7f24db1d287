//! Building blocks for search-experience widgets.
//!
//! # Public API Overview
//! - Share cross-component state through a [`Store`] and react to writes with
//!   disposable [`Subscription`]s.
//! - Implement [`Component`] on top of [`ComponentCore`] and register the kind
//!   with a [`ComponentManager`], which creates, tracks, and destroys instances.
//! - Drive keyboard navigation with the pure [`AutocompleteState`] machine, or
//!   use the ready-made [`AutoComplete`] widget.
//! - Feed suggestions through a [`SuggestionSource`]; responses are applied on
//!   the UI thread by [`ComponentManager::pump_responses`] and stale ones are
//!   dropped.
//!
//! The crate never installs a tracing subscriber; hosts call
//! [`logging::init_tracing`] if they want one.

#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod runtime;
pub mod store;
pub mod widgets;

/// Shared store and its subscription handles.
pub use crate::store::{Store, StoreCallback, StoreEvent, Subscription};

/// Component contract and base behaviour.
pub use crate::core::component::{
    merge_state, Component, ComponentCore, ComponentOptions, Lifecycle, ParentRef, SubmitHandler,
};

/// Autocomplete navigation state machine.
pub use crate::core::autocomplete::{
    AutocompleteEvent, AutocompleteState, Cursor, Effect, Phase, Transition,
};

/// Keys, host events, and suggestion data.
pub use crate::core::input_event::InputEvent;
pub use crate::core::keys::Key;
pub use crate::core::model::{sections_from_state, Section, Selection, SuggestionResult};

/// Rendering surface and renderer contracts.
pub use crate::core::surface::{
    selector_path, templates, Element, HeadlessSurface, LineRenderer, Renderer, Surface,
};

/// Width helpers used by the line renderer.
pub use crate::core::text::{truncate_to_width, visible_width};

/// Registry, manager, and suggestion delivery.
pub use crate::runtime::{
    constructor, ComponentContext, ComponentHandle, ComponentManager, ComponentRegistry,
    Constructor, InstanceId, ManagerParts, NoSuggestions, RequestTracker, ResponseSender,
    SuggestionKind, SuggestionRequest, SuggestionResponse, SuggestionSource,
};

/// Built-in widgets.
pub use crate::widgets::{
    register_builtin, AutoComplete, ResultItem, ResultType, Results, SearchState, VerticalResults,
};

/// Errors.
pub use crate::error::{ConfigurationError, EndpointError, FrameworkError, RegistryError};

/// Environment configuration and tracing setup.
pub use crate::config::EnvConfig;
pub use crate::logging::{init_tracing, LoggingConfig};
