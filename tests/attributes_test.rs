use jsonapi_resources::prelude::*;
use jsonapi_resources::testing::{query, BasicModel, Probe};
use serde_json::{json, Value};
use std::sync::Arc;

/// A resource whose only interesting attribute is expensive.
struct Profile {
    probe: Probe,
}

impl JsonApiResource for Profile {
    fn resource_id(&self) -> String {
        "profile-1".into()
    }

    fn attributes(&self, _request: &dyn RequestContext) -> Attributes<'_> {
        Attributes::new()
            .value("name", "Tim")
            .lazy("location", || self.probe.hit("Melbourne"))
            .try_lazy("score", || -> Result<Value, ResourceError> {
                Err("score service unavailable".into())
            })
            .when("admin", false, || -> Value { panic!("hidden attribute evaluated") })
            .value("nickname", Value::Null)
    }
}

fn user() -> ResourceNode {
    ResourceNode::new(Arc::new(
        BasicModel::new("user-1")
            .with_attribute("name", "Tim")
            .with_attribute("email", "tim@example.com")
            .with_attribute("location", "Melbourne"),
    ))
}

#[test]
fn test_maximal_mode_renders_every_attribute() {
    let mut root = user();
    let document = DocumentAssembler::default()
        .render(&mut root, &query(""))
        .expect("Failed to render");

    let json = serde_json::to_value(&document).expect("Failed to serialize");
    assert_eq!(
        json["data"]["attributes"],
        json!({ "name": "Tim", "email": "tim@example.com", "location": "Melbourne" })
    );
}

#[test]
fn test_sparse_fieldset_keeps_declaration_order() {
    let mut root = user();
    let document = DocumentAssembler::default()
        .render(&mut root, &query("fields[basicModels]=location,name"))
        .expect("Failed to render");

    let json = serde_json::to_value(&document).expect("Failed to serialize");
    let keys: Vec<&String> = json["data"]["attributes"]
        .as_object()
        .expect("attributes must be an object")
        .keys()
        .collect();
    assert_eq!(keys, vec!["name", "location"]);
}

#[test]
fn test_fieldset_for_other_type_does_not_apply() {
    let mut root = user();
    let document = DocumentAssembler::default()
        .render(&mut root, &query("fields[posts]=title"))
        .expect("Failed to render");

    let json = serde_json::to_value(&document).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"].as_object().map(|a| a.len()), Some(3));
}

#[test]
fn test_empty_fieldset_renders_no_attributes() {
    let mut root = user();
    let document = DocumentAssembler::default()
        .render(&mut root, &query("fields[basicModels]="))
        .expect("Failed to render");

    let json = serde_json::to_value(&document).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"], json!({}));
}

#[test]
fn test_minimal_mode_needs_a_fieldset() {
    let assembler = DocumentAssembler::new(RenderOptions::minimal());

    let mut root = user();
    let bare = assembler.render(&mut root, &query("")).expect("Failed to render");
    let json = serde_json::to_value(&bare).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"], json!({}));

    let selected = assembler
        .render(&mut root, &query("fields[basicModels]=email"))
        .expect("Failed to render");
    let json = serde_json::to_value(&selected).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"], json!({ "email": "tim@example.com" }));
}

#[test]
fn test_minimal_mode_skips_lazy_attributes() {
    let probe = Probe::new();
    let mut root = ResourceNode::new(Arc::new(Profile { probe: probe.clone() }));
    let assembler = DocumentAssembler::new(RenderOptions::minimal());

    // No fieldset: nothing is selected, so neither the probe nor the failing `score` runs.
    let bare = assembler
        .render(&mut root, &query(""))
        .expect("Unselected failures must not surface");
    let json = serde_json::to_value(&bare).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"], json!({}));
    assert_eq!(probe.calls(), 0, "Lazy producer ran under minimal mode");

    let selected = assembler
        .render(&mut root, &query("fields[profiles]=location"))
        .expect("Failed to render");
    let json = serde_json::to_value(&selected).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"], json!({ "location": "Melbourne" }));
    assert_eq!(probe.calls(), 1);
}

#[test]
fn test_unselected_lazy_attributes_never_run() {
    let probe = Probe::new();
    let mut root = ResourceNode::new(Arc::new(Profile { probe: probe.clone() }));

    // The failing `score` and panicking `admin` producers are skipped too.
    let document = DocumentAssembler::default()
        .render(&mut root, &query("fields[profiles]=name"))
        .expect("Unselected failures must not surface");

    let json = serde_json::to_value(&document).expect("Failed to serialize");
    assert_eq!(json["data"]["attributes"], json!({ "name": "Tim" }));
    assert_eq!(probe.calls(), 0, "Lazy producer ran although it was not selected");
}

#[test]
fn test_selected_lazy_attribute_runs_once_per_render() {
    let probe = Probe::new();
    let mut root = ResourceNode::new(Arc::new(Profile { probe: probe.clone() }));

    let document = DocumentAssembler::default()
        .render(&mut root, &query("fields[profiles]=location,admin,nickname"))
        .expect("Failed to render");

    let json = serde_json::to_value(&document).expect("Failed to serialize");
    assert_eq!(
        json["data"]["attributes"],
        json!({ "location": "Melbourne", "nickname": null }),
        "`when(false)` drops the key while an explicit null is kept"
    );
    assert_eq!(probe.calls(), 1);
}

#[test]
fn test_selected_failing_attribute_aborts_render() {
    let mut root = ResourceNode::new(Arc::new(Profile { probe: Probe::new() }));

    let error = DocumentAssembler::default()
        .respond(&mut root, &query("fields[profiles]=score"))
        .expect_err("A selected failing producer must abort the render");

    assert!(!error.is_client_error());
    match error {
        RenderError::Attribute { resource, attribute, source } => {
            assert_eq!(resource, "profiles:profile-1");
            assert_eq!(attribute, "score");
            assert_eq!(source.to_string(), "score service unavailable");
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}
