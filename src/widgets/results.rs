//! Results lists and their items.

use serde_json::{json, Value};

use crate::core::component::{merge_state, Component, ComponentCore, ComponentOptions};
use crate::core::surface::templates;
use crate::error::FrameworkError;
use crate::runtime::component_registry::{constructor, ComponentHandle, Constructor};
use crate::runtime::context::ComponentContext;
use crate::store::keys;

pub const RESULTS_KIND: &str = "Results";
pub const VERTICAL_RESULTS_KIND: &str = "VerticalResults";
pub const RESULTS_ITEM_KIND: &str = "ResultsItem";
pub const EVENT_RESULTS_ITEM_KIND: &str = "EventResultsItem";
pub const LOCATION_RESULTS_ITEM_KIND: &str = "LocationResultsItem";
pub const PEOPLE_RESULTS_ITEM_KIND: &str = "PeopleResultsItem";

/// Entity type carried in a result's `type` field. Selects the item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Event,
    Location,
    People,
}

impl ResultType {
    pub fn from_data(data: &Value) -> Option<Self> {
        match data.get("type").and_then(Value::as_str)? {
            "event" => Some(ResultType::Event),
            "location" => Some(ResultType::Location),
            "people" => Some(ResultType::People),
            _ => None,
        }
    }

    pub fn item_kind(self) -> &'static str {
        match self {
            ResultType::Event => EVENT_RESULTS_ITEM_KIND,
            ResultType::Location => LOCATION_RESULTS_ITEM_KIND,
            ResultType::People => PEOPLE_RESULTS_ITEM_KIND,
        }
    }
}

/// Child kind for `data`: the typed item kind when `data` names a known
/// result type, otherwise `requested`.
pub fn child_kind<'a>(data: &Value, requested: &'a str) -> &'a str {
    ResultType::from_data(data)
        .map(ResultType::item_kind)
        .unwrap_or(requested)
}

pub struct Results {
    core: ComponentCore,
    limit: usize,
}

impl Results {
    pub fn new(options: ComponentOptions, context: ComponentContext) -> Self {
        let limit = options
            .config_usize("limit")
            .filter(|limit| *limit > 0)
            .unwrap_or(context.config.results_limit);
        let module_id = options.config_str("moduleId").map(str::to_string);
        let core = ComponentCore::new(RESULTS_KIND, templates::RESULTS, &options, context)
            .with_module_id(module_id);
        Self { core, limit }
    }

    pub fn constructor() -> Constructor {
        constructor(|options, context| Ok(Box::new(Results::new(options, context))))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Component for Results {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    /// A payload with `results` is cut to `limit` entries and replaced by
    /// `{ resultsCount, results }`; each kept result becomes a child item.
    fn set_state(&mut self, data: Value) {
        let Some(results) = data.get("results").and_then(Value::as_array) else {
            self.core.set_state(data);
            return;
        };
        let limited: Vec<Value> = results.iter().take(self.limit).cloned().collect();

        self.core.clear_children();
        for result in &limited {
            if let Err(error) = self.add_child(result.clone(), RESULTS_ITEM_KIND) {
                tracing::warn!(component = %self.core.name(), %error, "result item not created");
            }
        }

        self.core.set_state(json!({
            "resultsCount": limited.len(),
            "results": limited,
        }));
    }

    fn add_child(&mut self, data: Value, kind: &str) -> Result<ComponentHandle, FrameworkError> {
        let kind = child_kind(&data, kind);
        self.core.add_child(data, kind)
    }
}

/// Leaf rendering of a single result.
pub struct ResultItem {
    core: ComponentCore,
}

impl ResultItem {
    pub fn new(kind: &str, options: ComponentOptions, context: ComponentContext) -> Self {
        Self {
            core: ComponentCore::new(kind, templates::RESULTS_ITEM, &options, context),
        }
    }

    pub fn constructor(kind: &'static str) -> Constructor {
        constructor(move |options, context| Ok(Box::new(ResultItem::new(kind, options, context))))
    }

    pub fn result_type(&self) -> Option<ResultType> {
        ResultType::from_data(self.core.state())
    }
}

impl Component for ResultItem {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    PreSearch,
    SearchLoading,
    SearchComplete,
}

impl SearchState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pre-search" => Some(SearchState::PreSearch),
            "search-loading" => Some(SearchState::SearchLoading),
            "search-complete" => Some(SearchState::SearchComplete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchState::PreSearch => "pre-search",
            SearchState::SearchLoading => "search-loading",
            SearchState::SearchComplete => "search-complete",
        }
    }
}

/// Results of the active vertical search, bound to `vertical-results`.
///
/// Stays unmounted until the first non-empty payload arrives.
pub struct VerticalResults {
    core: ComponentCore,
}

impl VerticalResults {
    pub fn new(options: ComponentOptions, context: ComponentContext) -> Self {
        let core = ComponentCore::new(
            VERTICAL_RESULTS_KIND,
            templates::VERTICAL_RESULTS,
            &options,
            context,
        )
        .with_module_id(Some(keys::VERTICAL_RESULTS.to_string()));
        Self { core }
    }

    pub fn constructor() -> Constructor {
        constructor(|options, context| Ok(Box::new(VerticalResults::new(options, context))))
    }
}

impl Component for VerticalResults {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn set_state(&mut self, data: Value) {
        let no_results = data
            .get("results")
            .and_then(Value::as_array)
            .is_none_or(Vec::is_empty);
        let search_state = data
            .get("searchState")
            .and_then(Value::as_str)
            .and_then(SearchState::parse)
            .unwrap_or_default();
        let query = self
            .core
            .context()
            .store
            .get(keys::QUERY)
            .unwrap_or(Value::Null);

        let model = merge_state(json!({ "results": [] }), data);
        let model = merge_state(
            model,
            json!({
                "isPreSearch": search_state == SearchState::PreSearch,
                "isSearchLoading": search_state == SearchState::SearchLoading,
                "isSearchComplete": search_state == SearchState::SearchComplete,
                "showNoResults": no_results,
                "query": query,
            }),
        );
        self.core.set_state(model);
    }
}
