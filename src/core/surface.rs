//! Rendering surface and renderer contracts.
//!
//! A `Surface` is the host's element tree (a DOM, a terminal layout, ...).
//! Components address elements by selector paths built with
//! [`selector_path`]; the surface decides what a selector means.
//!
//! A `Renderer` turns a template name plus a JSON model into output lines. It
//! must be idempotent: rendering the same model twice yields the same lines.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::text::truncate_to_width;

/// Join a container scope and a selector into one selector path.
pub fn selector_path(scope: Option<&str>, selector: &str) -> String {
    match scope.map(str::trim).filter(|scope| !scope.is_empty()) {
        Some(scope) => format!("{scope} {selector}"),
        None => selector.to_string(),
    }
}

pub trait Surface {
    fn contains(&self, selector: &str) -> bool;

    fn input_value(&self, selector: &str) -> Option<String>;

    /// Returns false when no element matches.
    fn set_input_value(&mut self, selector: &str, value: &str) -> bool;

    /// Returns false when no element matches.
    fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> bool;

    /// Replace the rendered content of a container. Returns false when no
    /// element matches.
    fn replace_content(&mut self, container: &str, lines: Vec<String>) -> bool;

    fn content(&self, container: &str) -> Option<Vec<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub value: String,
    pub attributes: BTreeMap<String, String>,
    pub content: Vec<String>,
    /// Number of content replacements that changed the content.
    pub repaints: usize,
}

/// In-memory surface keyed by selector path.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    elements: BTreeMap<String, Element>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, selector: impl Into<String>) -> Self {
        self.add_element(selector);
        self
    }

    pub fn add_element(&mut self, selector: impl Into<String>) {
        self.elements.entry(selector.into()).or_default();
    }

    pub fn remove_element(&mut self, selector: &str) -> Option<Element> {
        self.elements.remove(selector)
    }

    pub fn element(&self, selector: &str) -> Option<&Element> {
        self.elements.get(selector)
    }

    pub fn attribute(&self, selector: &str, name: &str) -> Option<&str> {
        self.elements
            .get(selector)?
            .attributes
            .get(name)
            .map(String::as_str)
    }
}

impl Surface for HeadlessSurface {
    fn contains(&self, selector: &str) -> bool {
        self.elements.contains_key(selector)
    }

    fn input_value(&self, selector: &str) -> Option<String> {
        self.elements.get(selector).map(|element| element.value.clone())
    }

    fn set_input_value(&mut self, selector: &str, value: &str) -> bool {
        let Some(element) = self.elements.get_mut(selector) else {
            return false;
        };
        element.value = value.to_string();
        true
    }

    fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> bool {
        let Some(element) = self.elements.get_mut(selector) else {
            return false;
        };
        element
            .attributes
            .insert(name.to_string(), value.to_string());
        true
    }

    fn replace_content(&mut self, container: &str, lines: Vec<String>) -> bool {
        let Some(element) = self.elements.get_mut(container) else {
            return false;
        };
        if element.content != lines {
            element.content = lines;
            element.repaints += 1;
        }
        true
    }

    fn content(&self, container: &str) -> Option<Vec<String>> {
        self.elements
            .get(container)
            .map(|element| element.content.clone())
    }
}

pub trait Renderer {
    fn render(&self, template: &str, model: &Value) -> Vec<String>;
}

pub mod templates {
    pub const AUTOCOMPLETE: &str = "search/autocomplete";
    pub const RESULTS: &str = "results/results";
    pub const RESULTS_ITEM: &str = "results/resultsitem";
    pub const VERTICAL_RESULTS: &str = "results/verticalresults";
}

/// Plain-text renderer for the built-in templates.
#[derive(Debug, Clone)]
pub struct LineRenderer {
    width: usize,
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self { width: 80 }
    }
}

impl LineRenderer {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(4) }
    }

    fn fit(&self, line: &str) -> String {
        truncate_to_width(line, self.width, "…")
    }

    fn render_autocomplete(&self, model: &Value) -> Vec<String> {
        if model.get("isOpen").and_then(Value::as_bool) != Some(true) {
            return Vec::new();
        }
        let section_index = model.get("sectionIndex").and_then(Value::as_u64);
        let result_index = model.get("resultIndex").and_then(Value::as_i64);
        let Some(sections) = model.get("sections").and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut lines = Vec::new();
        for (s_idx, section) in sections.iter().enumerate() {
            if let Some(label) = section.get("label").and_then(Value::as_str) {
                lines.push(self.fit(label));
            }
            let results = section
                .get("results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for (r_idx, result) in results.iter().enumerate() {
                let value = result.get("value").and_then(Value::as_str).unwrap_or("");
                let selected = section_index == Some(s_idx as u64)
                    && result_index == Some(r_idx as i64);
                let prefix = if selected { "→ " } else { "  " };
                lines.push(self.fit(&format!("{prefix}{value}")));
            }
        }
        lines
    }

    fn render_results(&self, model: &Value) -> Vec<String> {
        let results = model
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let count = model
            .get("resultsCount")
            .and_then(Value::as_u64)
            .unwrap_or(results.len() as u64);
        let mut lines = vec![self.fit(&format!("{count} results"))];
        lines.extend(results.iter().map(|result| self.fit(&item_title(result))));
        lines
    }

    fn render_vertical_results(&self, model: &Value) -> Vec<String> {
        let flag = |name: &str| model.get(name).and_then(Value::as_bool) == Some(true);
        if flag("isSearchLoading") {
            return vec![self.fit("Loading…")];
        }
        if flag("isPreSearch") {
            return Vec::new();
        }
        if flag("showNoResults") {
            let query = model.get("query").and_then(Value::as_str).unwrap_or("");
            return vec![self.fit(&format!("No results found for \"{query}\""))];
        }
        self.render_results(model)
    }
}

fn item_title(result: &Value) -> String {
    ["title", "name", "value"]
        .iter()
        .find_map(|field| result.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| result.to_string())
}

impl Renderer for LineRenderer {
    fn render(&self, template: &str, model: &Value) -> Vec<String> {
        match template {
            templates::AUTOCOMPLETE => self.render_autocomplete(model),
            templates::RESULTS => self.render_results(model),
            templates::VERTICAL_RESULTS => self.render_vertical_results(model),
            templates::RESULTS_ITEM => vec![self.fit(&item_title(model))],
            _ => vec![self.fit(&model.to_string())],
        }
    }
}
