use serde_json::json;

use form_autofill::page::collector::collect;
use form_autofill::page::descriptor::{css_path, describe, normalize, resolve_label};
use form_autofill::page::field_model::FieldDescriptor;
use form_autofill::page::page_model::DomNode;

use crate::common::utils::{input, load_fixture, nodes};

mod common;

fn describe_page(page: &[DomNode]) -> Vec<FieldDescriptor> {
    collect(page)
        .iter()
        .enumerate()
        .map(|(i, f)| describe(f, i))
        .collect()
}

// =========================================================================
// Label resolution
// =========================================================================

#[test]
fn label_prefers_explicit_label_over_everything() {
    let node: DomNode = serde_json::from_value(json!({
        "nodeRef": 1,
        "tag": "input",
        "name": "fname",
        "placeholder": "Type here",
        "ariaLabel": "Aria name",
        "labelForText": "First Name",
        "enclosingLabelText": "Wrapped label",
    }))
    .unwrap();

    assert_eq!(resolve_label(&node), "First Name");
}

#[test]
fn label_falls_back_through_the_chain() {
    let enclosing: DomNode = serde_json::from_value(json!({
        "nodeRef": 1, "tag": "input", "name": "a",
        "enclosingLabelText": "  Wrapped  ", "placeholder": "p",
    }))
    .unwrap();
    assert_eq!(resolve_label(&enclosing), "Wrapped");

    let aria: DomNode = serde_json::from_value(json!({
        "nodeRef": 2, "tag": "input", "name": "b", "ariaLabel": "Spoken",
    }))
    .unwrap();
    assert_eq!(resolve_label(&aria), "Spoken");

    let placeholder: DomNode = serde_json::from_value(json!({
        "nodeRef": 3, "tag": "input", "name": "c", "placeholder": "Hint",
    }))
    .unwrap();
    assert_eq!(resolve_label(&placeholder), "Hint");

    let name_only: DomNode = serde_json::from_value(json!({
        "nodeRef": 4, "tag": "input", "name": "last_resort",
    }))
    .unwrap();
    assert_eq!(resolve_label(&name_only), "last_resort");

    let bare: DomNode = serde_json::from_value(json!({ "nodeRef": 5, "tag": "input" })).unwrap();
    assert_eq!(resolve_label(&bare), "");
}

// =========================================================================
// CSS path
// =========================================================================

#[test]
fn css_path_uses_unique_id_directly() {
    let node: DomNode = serde_json::from_value(json!({
        "nodeRef": 1, "tag": "input", "id": "email", "idUnique": true,
        "ancestors": [{ "tag": "form", "id": "apply" }],
    }))
    .unwrap();

    assert_eq!(css_path(&node), "#email");
}

#[test]
fn css_path_walks_ancestors_and_anchors_at_an_id() {
    let node: DomNode = serde_json::from_value(json!({
        "nodeRef": 1, "tag": "input", "nthOfType": 2,
        "classes": ["form-control"],
        "ancestors": [
            { "tag": "div", "classes": ["field", "field-wide", "extra"], "nthOfType": 3 },
            { "tag": "form", "id": "apply" },
            { "tag": "body" }
        ],
    }))
    .unwrap();

    // Walk stops at form#apply; classes cap at two; self segment last.
    assert_eq!(
        css_path(&node),
        "form#apply > div.field.field-wide:nth-of-type(3) > input.form-control:nth-of-type(2)"
    );
}

#[test]
fn css_path_degrades_to_empty_without_structure() {
    let node: DomNode =
        serde_json::from_value(json!({ "nodeRef": 1, "tag": "input" })).unwrap();
    assert_eq!(css_path(&node), "");
}

// =========================================================================
// Stable keys
// =========================================================================

#[test]
fn stable_keys_are_identical_across_collection_passes() {
    let page = load_fixture("job_application.json");

    let first_pass = describe_page(&page);
    let second_pass = describe_page(&page);

    for (a, b) in first_pass.iter().zip(&second_pass) {
        assert_eq!(a.key, b.key, "key drifted for field '{}'", a.name);
    }
}

#[test]
fn stable_key_ignores_the_pass_local_index() {
    let page = load_fixture("job_application.json");
    let fields = collect(&page);

    // Same element described at two different positions keys identically.
    let at_zero = describe(&fields[3], 0);
    let at_nine = describe(&fields[3], 9);

    assert_ne!(at_zero.index, at_nine.index);
    assert_eq!(at_zero.key, at_nine.key);
}

#[test]
fn stable_key_distinguishes_structurally_different_fields() {
    let page = load_fixture("job_application.json");
    let descriptors = describe_page(&page);

    let mut keys: Vec<&str> = descriptors.iter().map(|d| d.key.as_str()).collect();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), descriptors.len(), "stable keys collided");
}

#[test]
fn stable_key_is_case_and_whitespace_insensitive() {
    let a = nodes(vec![{
        let mut n = input(1, "email", "email");
        n["labelForText"] = json!("Email   Address");
        n
    }]);
    let b = nodes(vec![{
        let mut n = input(1, "email", "email");
        n["labelForText"] = json!("  email ADDRESS ");
        n
    }]);

    assert_eq!(describe_page(&a)[0].key, describe_page(&b)[0].key);
}

// =========================================================================
// Normalization
// =========================================================================

#[test]
fn normalize_collapses_case_and_whitespace() {
    assert_eq!(normalize("  First\t Name "), "first name");
    assert_eq!(normalize("EMAIL"), "email");
    assert_eq!(normalize(""), "");
}
