//! Built-in search widgets.

pub mod autocomplete;
pub mod results;

pub use autocomplete::AutoComplete;
pub use results::{ResultItem, ResultType, Results, SearchState, VerticalResults};

use crate::error::RegistryError;
use crate::runtime::manager::ComponentManager;

/// Register every built-in widget kind with `manager`.
pub fn register_builtin(manager: &ComponentManager) -> Result<(), RegistryError> {
    manager.register(autocomplete::KIND, AutoComplete::constructor())?;
    manager.register(results::RESULTS_KIND, Results::constructor())?;
    manager.register(results::VERTICAL_RESULTS_KIND, VerticalResults::constructor())?;
    for kind in [
        results::RESULTS_ITEM_KIND,
        results::EVENT_RESULTS_ITEM_KIND,
        results::LOCATION_RESULTS_ITEM_KIND,
        results::PEOPLE_RESULTS_ITEM_KIND,
    ] {
        manager.register(kind, ResultItem::constructor(kind))?;
    }
    Ok(())
}
