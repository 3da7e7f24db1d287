//! AutoComplete widget: binds an input element to the navigation state
//! machine and to the suggestion source.

use serde_json::Value;

use crate::core::autocomplete::{AutocompleteEvent, AutocompleteState, Effect, Transition};
use crate::core::component::{merge_state, Component, ComponentCore, ComponentOptions, SubmitHandler};
use crate::core::input_event::InputEvent;
use crate::core::model::sections_from_state;
use crate::core::surface::templates;
use crate::error::{ConfigurationError, FrameworkError};
use crate::runtime::component_registry::{constructor, Constructor};
use crate::runtime::context::ComponentContext;
use crate::runtime::suggestions::{SuggestionKind, SuggestionRequest};
use crate::store::keys;

pub const KIND: &str = "AutoComplete";
pub const DEFAULT_INPUT_SELECTOR: &str = ".js-yext-query";

pub struct AutoComplete {
    core: ComponentCore,
    bar_key: Option<String>,
    experience_key: Option<String>,
    filter_search: bool,
    input_selector: String,
    on_submit: Option<SubmitHandler>,
    machine: AutocompleteState,
}

impl AutoComplete {
    pub fn new(options: ComponentOptions, context: ComponentContext) -> Self {
        let bar_key = options.config_str("barKey").map(str::to_string);
        let experience_key = options.config_str("experienceKey").map(str::to_string);
        let module_id = keys::autocomplete(bar_key.as_deref());
        let core = ComponentCore::new(KIND, templates::AUTOCOMPLETE, &options, context)
            .with_module_id(Some(module_id));
        let input_selector =
            core.scoped_selector(options.config_str("inputEl").unwrap_or(DEFAULT_INPUT_SELECTOR));

        Self {
            core,
            bar_key,
            experience_key,
            filter_search: options.config_bool("filterSearch"),
            input_selector,
            on_submit: options.on_submit.clone(),
            machine: AutocompleteState::new(),
        }
    }

    pub fn constructor() -> Constructor {
        constructor(|options, context| Ok(Box::new(AutoComplete::new(options, context))))
    }

    pub fn machine(&self) -> &AutocompleteState {
        &self.machine
    }

    pub fn input_selector(&self) -> &str {
        &self.input_selector
    }

    pub fn suggestion_kind(&self) -> SuggestionKind {
        if self.filter_search {
            SuggestionKind::Filter
        } else if self.experience_key.is_some() {
            SuggestionKind::Vertical
        } else {
            SuggestionKind::Universal
        }
    }

    fn module_key(&self) -> String {
        self.core
            .module_id()
            .map(str::to_string)
            .unwrap_or_else(|| keys::autocomplete(self.bar_key.as_deref()))
    }

    fn input_text(&self) -> String {
        self.core
            .context()
            .surface
            .borrow()
            .input_value(&self.input_selector)
            .unwrap_or_default()
    }

    fn apply(&mut self, event: AutocompleteEvent) {
        let before = self.machine.phase();
        let Transition { state, effects } = std::mem::take(&mut self.machine).transition(event);
        self.machine = state;
        if self.core.context().config.debug {
            tracing::debug!(
                component = %self.core.name(),
                ?before,
                after = ?self.machine.phase(),
                cursor = ?self.machine.cursor(),
                effects = effects.len(),
                "autocomplete transition"
            );
        }
        for effect in effects {
            self.run(effect);
        }
        self.repaint();
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::SetInputText(text) => {
                let written = self
                    .core
                    .context()
                    .surface
                    .borrow_mut()
                    .set_input_value(&self.input_selector, &text);
                if !written {
                    tracing::warn!(selector = %self.input_selector, "autocomplete input disappeared");
                }
            }
            Effect::RequestSuggestions(input) => self.request(input),
            Effect::Submit(selection) => {
                if let Some(on_submit) = self.on_submit.clone() {
                    on_submit(&selection);
                }
            }
            Effect::CancelPending => {
                let key = self.module_key();
                self.core.context().requests.invalidate(&key);
            }
        }
    }

    fn request(&self, input: String) {
        let context = self.core.context();
        let key = self.module_key();
        let seq = context.requests.issue(&key);
        let request = SuggestionRequest {
            key,
            seq,
            kind: self.suggestion_kind(),
            input,
            experience_key: self.experience_key.clone(),
            bar_key: self.bar_key.clone(),
        };
        tracing::trace!(key = %request.key, seq, kind = request.kind.as_str(), "suggestions requested");
        context.suggestions.dispatch(request, context.responses.clone());
    }

    fn repaint(&mut self) {
        let model = self.machine.render_model();
        self.core.set_state(model);
    }
}

fn parse_filter(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|error| {
        tracing::warn!(%error, "ignoring malformed filter attribute");
        Value::Null
    })
}

impl Component for AutoComplete {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self) -> Result<(), FrameworkError> {
        let surface = &self.core.context().surface;
        if !surface.borrow().contains(&self.input_selector) {
            return Err(ConfigurationError::MissingElement {
                component: self.core.name().to_string(),
                selector: self.input_selector.clone(),
            }
            .into());
        }
        surface
            .borrow_mut()
            .set_attribute(&self.input_selector, "autocomplete", "off");
        self.core.init()
    }

    /// Accepts a `{ "sections": [...] }` payload and keeps the cursor fields
    /// in the rendered state. If new sections drop the highlight, the input
    /// goes back to the typed text.
    fn set_state(&mut self, data: Value) {
        let sections = sections_from_state(&data);
        let shown = self.machine.displayed_query().to_string();
        self.machine = std::mem::take(&mut self.machine).receive_sections(sections);
        if self.machine.displayed_query() != shown {
            let restored = self.machine.displayed_query().to_string();
            self.run(Effect::SetInputText(restored));
        }
        let model = merge_state(data, self.machine.render_model());
        self.core.set_state(model);
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let event = match event {
            InputEvent::Focus => AutocompleteEvent::Focus {
                input: self.input_text(),
            },
            InputEvent::Blur => AutocompleteEvent::Blur,
            InputEvent::KeyDown { key } => AutocompleteEvent::KeyDown { key: *key },
            InputEvent::KeyUp { key } => AutocompleteEvent::KeyUp {
                key: *key,
                input: self.input_text(),
            },
            InputEvent::MouseDown { value, filter } => AutocompleteEvent::SelectResult {
                value: value.clone(),
                filter: parse_filter(filter),
            },
        };
        self.apply(event);
    }
}

#[cfg(test)]
mod tests {
    use super::parse_filter;
    use serde_json::{json, Value};

    #[test]
    fn filter_attribute_parses_or_reads_as_null() {
        assert_eq!(parse_filter(r#"{"c_city":{"$eq":"Arlington"}}"#), json!({ "c_city": { "$eq": "Arlington" } }));
        assert_eq!(parse_filter(""), Value::Null);
        assert_eq!(parse_filter("{not json"), Value::Null);
    }
}
