//! Well-known store keys.

pub const AUTOCOMPLETE: &str = "autocomplete";
pub const QUERY: &str = "query";
pub const VERTICAL_RESULTS: &str = "vertical-results";
pub const UNIVERSAL_RESULTS: &str = "universal-results";

/// `autocomplete` or `autocomplete.<barKey>`.
pub fn autocomplete(bar_key: Option<&str>) -> String {
    scoped(AUTOCOMPLETE, bar_key)
}

/// `query.<componentName>`.
pub fn query(component_name: &str) -> String {
    scoped(QUERY, Some(component_name))
}

pub fn scoped(base: &str, scope: Option<&str>) -> String {
    match scope.map(str::trim).filter(|scope| !scope.is_empty()) {
        Some(scope) => format!("{base}.{scope}"),
        None => base.to_string(),
    }
}
