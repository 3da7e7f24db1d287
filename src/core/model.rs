//! Suggestion data delivered through the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One suggestion entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_value: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub filter: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SuggestionResult {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_short_value(mut self, short_value: impl Into<String>) -> Self {
        self.short_value = short_value.into();
        self
    }

    /// Text written into the input while this result is highlighted.
    pub fn display_value(&self) -> &str {
        if self.short_value.is_empty() {
            &self.value
        } else {
            &self.short_value
        }
    }
}

/// A group of results under one heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub results: Vec<SuggestionResult>,
}

impl Section {
    pub fn new(results: Vec<SuggestionResult>) -> Self {
        Self {
            label: None,
            results,
        }
    }

    pub fn labeled(label: impl Into<String>, results: Vec<SuggestionResult>) -> Self {
        Self {
            label: Some(label.into()),
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// The result a user committed to, handed to submit callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub value: String,
    pub filter: Value,
}

/// Parse the `sections` field out of a store payload. Missing or malformed
/// sections read as empty.
pub fn sections_from_state(state: &Value) -> Vec<Section> {
    state
        .get("sections")
        .cloned()
        .and_then(|sections| serde_json::from_value(sections).ok())
        .unwrap_or_default()
}
