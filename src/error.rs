//! Error types shared by the store, registry, and components.

use thiserror::Error;

use crate::core::component::Lifecycle;

/// A required rendering hook is missing or malformed.
///
/// Raised while a component is being created; the component is not recorded
/// as active.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("could not initialize {component}: missing element for selector `{selector}`")]
    MissingElement {
        component: String,
        selector: String,
    },

    #[error("invalid option `{option}` for {component}: {reason}")]
    InvalidOption {
        component: String,
        option: &'static str,
        reason: String,
    },

    #[error("{component} requires a parent container to resolve `{selector}`")]
    MissingParent {
        component: String,
        selector: String,
    },
}

/// Lookup failures in the component registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("component type '{0}' is not registered")]
    Unregistered(String),

    #[error("component type '{0}' is already registered; use register_override to replace it")]
    Duplicate(String),

    #[error("component manager was dropped before '{0}' could be created")]
    ManagerDropped(String),
}

/// A remote suggestion/search call failed.
///
/// Tagged with the originating operation so callers can tell failures apart
/// without inspecting transport details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} request failed: {message}")]
pub struct EndpointError {
    pub operation: String,
    pub message: String,
}

impl EndpointError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Top-level error returned from component creation and lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{component} cannot move from {from:?} to {to:?}")]
    Lifecycle {
        component: String,
        from: Lifecycle,
        to: Lifecycle,
    },
}

impl FrameworkError {
    #[must_use]
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
