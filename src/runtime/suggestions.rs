//! Suggestion requests and the channel that carries their responses back to
//! the UI thread.
//!
//! A `SuggestionSource` must not block: it hands the request to whatever does
//! the work (a runtime, a thread, a test fixture) and sends exactly one
//! `SuggestionResponse` through the supplied sender when it finishes.

use std::sync::mpsc;

use crate::core::model::Section;
use crate::error::EndpointError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    /// Suggestions across every vertical.
    Universal,
    /// Suggestions scoped to one experience/vertical.
    Vertical,
    /// Filter suggestions for a filter-search bar.
    Filter,
}

impl SuggestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionKind::Universal => "universal",
            SuggestionKind::Vertical => "vertical",
            SuggestionKind::Filter => "filter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// Store key the response is written to.
    pub key: String,
    pub seq: u64,
    pub kind: SuggestionKind,
    pub input: String,
    pub experience_key: Option<String>,
    pub bar_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionResponse {
    pub key: String,
    pub seq: u64,
    pub outcome: Result<Vec<Section>, EndpointError>,
}

impl SuggestionResponse {
    pub fn ok(request: &SuggestionRequest, sections: Vec<Section>) -> Self {
        Self {
            key: request.key.clone(),
            seq: request.seq,
            outcome: Ok(sections),
        }
    }

    pub fn failed(request: &SuggestionRequest, error: EndpointError) -> Self {
        Self {
            key: request.key.clone(),
            seq: request.seq,
            outcome: Err(error),
        }
    }
}

pub type ResponseSender = mpsc::Sender<SuggestionResponse>;

pub trait SuggestionSource {
    fn dispatch(&self, request: SuggestionRequest, reply: ResponseSender);
}

/// Source that never answers. Useful for hosts that only render results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuggestions;

impl SuggestionSource for NoSuggestions {
    fn dispatch(&self, request: SuggestionRequest, _reply: ResponseSender) {
        tracing::trace!(key = %request.key, seq = request.seq, "suggestion request discarded");
    }
}
