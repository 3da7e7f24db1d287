//! Shapes endpoint payloads into suggestion sections.
//!
//! Each function takes the inner `response` object of an API reply. The
//! autocomplete endpoints answer with a flat `results` list, which becomes a
//! single unlabeled section; filter search answers with labeled `sections`.

use search_ui::{Section, SuggestionResult};
use serde_json::Value;

/// Universal autocomplete: one section, or none when nothing matched.
pub fn universal(response: &Value) -> Result<Vec<Section>, serde_json::Error> {
    let results = results_of(response)?;
    Ok(single_section(results))
}

/// Vertical autocomplete. Results without a key are tagged with `bar_key`.
pub fn vertical(
    response: &Value,
    bar_key: Option<&str>,
) -> Result<Vec<Section>, serde_json::Error> {
    let results = results_of(response)?
        .into_iter()
        .map(|result| with_default_key(result, bar_key))
        .collect();
    Ok(single_section(results))
}

/// Filter search: labeled sections; empty sections are kept so section
/// positions match the server's.
pub fn filter(response: &Value, bar_key: Option<&str>) -> Result<Vec<Section>, serde_json::Error> {
    let Some(sections) = response.get("sections") else {
        return Ok(Vec::new());
    };
    let sections: Vec<Section> = serde_json::from_value(sections.clone())?;
    Ok(sections
        .into_iter()
        .map(|section| Section {
            label: section.label,
            results: section
                .results
                .into_iter()
                .map(|result| with_default_key(result, bar_key))
                .collect(),
        })
        .collect())
}

fn results_of(response: &Value) -> Result<Vec<SuggestionResult>, serde_json::Error> {
    match response.get("results") {
        Some(results) => serde_json::from_value(results.clone()),
        None => Ok(Vec::new()),
    }
}

fn single_section(results: Vec<SuggestionResult>) -> Vec<Section> {
    if results.is_empty() {
        Vec::new()
    } else {
        vec![Section::new(results)]
    }
}

fn with_default_key(mut result: SuggestionResult, bar_key: Option<&str>) -> SuggestionResult {
    if result.key.is_none() {
        result.key = bar_key.map(str::to_string);
    }
    result
}
