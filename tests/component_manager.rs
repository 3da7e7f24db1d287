
use harness::{section, Harness};
use pretty_assertions::assert_eq;
use search_ui::{
    constructor, AutoComplete, Component, ComponentCore, ComponentOptions, FrameworkError,
    InstanceId, Lifecycle, RegistryError,
};
use serde_json::json;

const INPUT: &str = ".js-yext-query";

struct Banner {
    core: ComponentCore,
}

impl Component for Banner {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }
}

fn banner() -> search_ui::Constructor {
    constructor(|options, context| {
        Ok(Box::new(Banner {
            core: ComponentCore::new("Banner", "banner", &options, context),
        }))
    })
}

#[test]
fn creating_an_unregistered_kind_fails_without_a_table_entry() {
    let harness = Harness::new(&[]);
    let err = harness
        .manager
        .create("Widget", ComponentOptions::new().with_id("w"))
        .expect_err("unregistered");
    assert!(err.is_registry());
    assert_eq!(
        err,
        FrameworkError::Registry(RegistryError::Unregistered("Widget".to_string()))
    );
    assert_eq!(harness.manager.active_count(), 0);
    assert!(harness.manager.get_instance(&InstanceId::from("w")).is_none());
}

#[test]
fn duplicate_registration_requires_explicit_override() {
    let harness = Harness::new(&[]);
    assert_eq!(
        harness.manager.register("AutoComplete", AutoComplete::constructor()),
        Err(RegistryError::Duplicate("AutoComplete".to_string()))
    );

    assert!(harness.manager.register_override("Results", banner()).is_some());
    let handle = harness
        .manager
        .create("Results", ComponentOptions::new())
        .expect("created");
    assert_eq!(handle.borrow().kind(), "Banner");
}

#[test]
fn registered_kind_creates_matching_instance() {
    let harness = Harness::new(&[]);
    harness.manager.register("Banner", banner()).expect("register");
    let handle = harness
        .manager
        .create("Banner", ComponentOptions::new().with_name("hero"))
        .expect("created");
    let component = handle.borrow();
    assert_eq!(component.kind(), "Banner");
    assert_eq!(component.name(), "hero");
    assert_eq!(component.lifecycle(), Lifecycle::Initialized);
    assert!(component.id().as_str().starts_with("Banner#"));
}

#[test]
fn newest_instance_of_a_kind_takes_over_the_shared_key() {
    let harness = Harness::new(&[INPUT]);
    let header = InstanceId::from("header");
    let footer = InstanceId::from("footer");
    for id in [&header, &footer] {
        harness
            .manager
            .create("AutoComplete", ComponentOptions::new().with_id(id.clone()))
            .expect("created");
    }

    assert_eq!(harness.manager.instances_of("AutoComplete"), vec![header.clone(), footer.clone()]);
    let active = harness.manager.get_active("AutoComplete").expect("active");
    assert_eq!(active.borrow().id(), &footer);

    let store = harness.manager.store();
    assert_eq!(store.subscriber_count("autocomplete"), 1);
    assert_eq!(store.subscriber_count("autocomplete.header"), 1);
    assert_eq!(harness.manager.module_key(&footer).as_deref(), Some("autocomplete"));
    assert_eq!(harness.manager.module_key(&header).as_deref(), Some("autocomplete.header"));
    let header_handle = harness.manager.get_instance(&header).expect("live");
    assert_eq!(header_handle.borrow().module_id(), Some("autocomplete.header"));

    store.set("autocomplete", json!({ "sections": [section(&["pizza"])] }));
    assert_eq!(active.borrow().state()["isOpen"], json!(true));
    assert_ne!(header_handle.borrow().state()["isOpen"], json!(true));

    store.set("autocomplete.header", json!({ "sections": [section(&["tacos"])] }));
    assert_eq!(header_handle.borrow().state()["isOpen"], json!(true));

    assert!(harness.manager.destroy(&footer));
    let active = harness.manager.get_active("AutoComplete").expect("active");
    assert_eq!(active.borrow().id(), &header);
    assert_eq!(store.subscriber_count("autocomplete"), 0);
    assert!(harness.manager.is_subscribed(&header));
}

#[test]
fn recreating_an_id_tears_down_the_previous_instance() {
    let harness = Harness::new(&[INPUT]);
    let first = harness
        .manager
        .create("AutoComplete", ComponentOptions::new().with_id("search"))
        .expect("created");
    let second = harness
        .manager
        .create("AutoComplete", ComponentOptions::new().with_id("search"))
        .expect("created");

    assert_eq!(first.borrow().lifecycle(), Lifecycle::Unmounted);
    assert_eq!(second.borrow().lifecycle(), Lifecycle::Initialized);
    assert_eq!(harness.manager.active_count(), 1);
    assert_eq!(harness.manager.store().subscriber_count("autocomplete"), 1);
    assert!(harness.manager.is_subscribed(&InstanceId::from("search")));
}

#[test]
fn results_limit_and_dispatch_children_by_type() {
    let harness = Harness::new(&["#results"]);
    let handle = harness
        .manager
        .create(
            "Results",
            ComponentOptions::new()
                .with_id("results")
                .with_container("#results")
                .with_option("limit", json!(2)),
        )
        .expect("created");
    assert_eq!(handle.borrow().lifecycle(), Lifecycle::Initialized);

    handle.borrow_mut().set_state(json!({
        "results": [
            { "type": "event", "title": "Pizza Night" },
            { "type": "location", "title": "Pizza Palace" },
            { "title": "Pizza FAQ" }
        ]
    }));

    let state = handle.borrow().state().clone();
    assert_eq!(state["resultsCount"], json!(2));
    assert_eq!(harness.content("#results"), vec!["2 results", "Pizza Night", "Pizza Palace"]);

    let kinds: Vec<String> = handle
        .borrow()
        .core()
        .children()
        .iter()
        .map(|child| child.borrow().kind().to_string())
        .collect();
    assert_eq!(kinds, vec!["EventResultsItem", "LocationResultsItem"]);
    assert!(harness
        .manager
        .get_instance(&InstanceId::from("results/EventResultsItem#0"))
        .is_some());

    handle.borrow_mut().set_state(json!({ "results": [{ "type": "people", "name": "Ada" }] }));
    assert!(harness
        .manager
        .get_instance(&InstanceId::from("results/EventResultsItem#0"))
        .is_none());
    assert_eq!(harness.manager.instances_of("PeopleResultsItem").len(), 1);
}

#[test]
fn vertical_results_mount_only_once_state_arrives() {
    let harness = Harness::new(&["#vertical"]);
    let handle = harness
        .manager
        .create("VerticalResults", ComponentOptions::new().with_container("#vertical"))
        .expect("created");
    assert_eq!(handle.borrow().lifecycle(), Lifecycle::Initialized);
    assert_eq!(handle.borrow().module_id(), Some("vertical-results"));
    assert!(harness.content("#vertical").is_empty());

    harness.manager.store().set("query", json!("pizza"));
    harness.manager.store().set(
        "vertical-results",
        json!({ "results": [], "searchState": "search-complete" }),
    );

    let state = handle.borrow().state().clone();
    assert_eq!(state["isSearchComplete"], json!(true));
    assert_eq!(state["isPreSearch"], json!(false));
    assert_eq!(state["showNoResults"], json!(true));
    assert_eq!(handle.borrow().lifecycle(), Lifecycle::Mounted);
    assert_eq!(harness.content("#vertical"), vec!["No results found for \"pizza\""]);
}

#[test]
fn destroy_clears_rendered_content() {
    let harness = Harness::new(&["#vertical"]);
    harness
        .manager
        .store()
        .set("vertical-results", json!({ "results": [{ "title": "Pizza Palace" }], "searchState": "search-complete" }));
    let handle = harness
        .manager
        .create("VerticalResults", ComponentOptions::new().with_id("vr").with_container("#vertical"))
        .expect("created");
    assert_eq!(harness.content("#vertical"), vec!["1 results", "Pizza Palace"]);

    assert!(harness.manager.destroy(&InstanceId::from("vr")));
    assert_eq!(handle.borrow().lifecycle(), Lifecycle::Unmounted);
    assert!(harness.content("#vertical").is_empty());
    assert_eq!(harness.manager.store().subscriber_count("vertical-results"), 0);
}
