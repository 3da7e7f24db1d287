//! HTTP client for the autocomplete and filter-search endpoints.
//!
//! [`AutocompleteApi`] builds and sends requests and shapes replies into
//! [`search_ui::Section`]s. [`ApiSuggestionSource`] plugs it into a
//! [`search_ui::ComponentManager`] as its suggestion source. No retries are
//! attempted; a failure is reported once, tagged with its operation.

pub mod client;
pub mod config;
pub mod error;
pub mod source;
pub mod transform;

pub use client::{AutocompleteApi, CancellationSignal};
pub use config::SearchApiConfig;
pub use error::SearchApiError;
pub use source::ApiSuggestionSource;
