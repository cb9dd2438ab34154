use serde_json::json;

use form_autofill::page::collector::{collect, infer_kind};
use form_autofill::page::field_model::{ControlKind, FieldKind, ORDER_UNTRUSTED};

use crate::common::utils::{input, load_fixture, nodes, with_form, with_label};

mod common;

// =========================================================================
// Ordering and grouping
// =========================================================================

#[test]
fn collects_form_fields_before_standalone_fields() {
    let page = nodes(vec![
        input(1, "newsletter", "text"),
        with_form(input(2, "username", "text"), 0),
        with_form(input(3, "password", "password"), 0),
    ]);

    let fields = collect(&page);
    assert_eq!(fields.len(), 3);

    // Form fields first, document order preserved within the form.
    assert_eq!(fields[0].node.node_ref, 2);
    assert_eq!(fields[0].form_index, 0);
    assert_eq!(fields[0].order_within_form, 0);
    assert_eq!(fields[1].node.node_ref, 3);
    assert_eq!(fields[1].order_within_form, 1);

    // Standalone field last, with its own counter and no form.
    assert_eq!(fields[2].node.node_ref, 1);
    assert_eq!(fields[2].form_index, -1);
    assert_eq!(fields[2].order_within_form, 0);
}

#[test]
fn groups_fields_by_form_in_form_order() {
    // Interleaved document order: form 1, form 0, form 1, form 0.
    let page = nodes(vec![
        with_form(input(1, "a", "text"), 1),
        with_form(input(2, "b", "text"), 0),
        with_form(input(3, "c", "text"), 1),
        with_form(input(4, "d", "text"), 0),
    ]);

    let fields = collect(&page);
    let order: Vec<(u32, i32, u32)> = fields
        .iter()
        .map(|f| (f.node.node_ref, f.form_index, f.order_within_form))
        .collect();

    assert_eq!(
        order,
        vec![(2, 0, 0), (4, 0, 1), (1, 1, 0), (3, 1, 1)]
    );
}

#[test]
fn content_editable_and_aria_textboxes_sort_last_with_untrusted_order() {
    let editable = json!({
        "nodeRef": 10,
        "tag": "div",
        "contentEditable": true,
        "rect": { "width": 300.0, "height": 60.0 },
    });
    let aria = json!({
        "nodeRef": 11,
        "tag": "div",
        "role": "textbox",
        "rect": { "width": 300.0, "height": 40.0 },
    });
    let page = nodes(vec![editable, aria, with_form(input(1, "q", "text"), 0)]);

    let fields = collect(&page);
    assert_eq!(fields[0].node.node_ref, 1);

    assert_eq!(fields[1].node.node_ref, 10);
    assert_eq!(fields[1].control, ControlKind::ContentEditable);
    assert_eq!(fields[1].order_within_form, ORDER_UNTRUSTED);

    assert_eq!(fields[2].node.node_ref, 11);
    assert_eq!(fields[2].control, ControlKind::AriaTextbox);
    assert_eq!(fields[2].order_within_form, ORDER_UNTRUSTED);
}

#[test]
fn a_node_is_collected_at_most_once_across_passes() {
    // An input that also carries an aria-label must not reappear as an
    // ARIA-textbox candidate.
    let mut labeled = input(1, "search", "text");
    labeled["ariaLabel"] = json!("Search");

    let fields = collect(&nodes(vec![labeled]));
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].control, ControlKind::Input);
}

// =========================================================================
// Filtering
// =========================================================================

#[test]
fn excludes_chrome_inputs_and_invisible_elements() {
    let page = load_fixture("job_application.json");
    let fields = collect(&page);

    let refs: Vec<u32> = fields.iter().map(|f| f.node.node_ref).collect();
    // hidden (11), submit (12), and the 1x1 honeypot (13) are out.
    assert!(!refs.contains(&11));
    assert!(!refs.contains(&12));
    assert!(!refs.contains(&13));

    // Everything fillable made it, including the file input and the
    // content-editable / ARIA stragglers.
    assert_eq!(
        refs,
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 14, 15, 16]
    );
}

#[test]
fn disabled_controls_are_skipped() {
    let mut disabled = with_form(input(1, "frozen", "text"), 0);
    disabled["disabled"] = json!(true);

    let fields = collect(&nodes(vec![disabled, with_form(input(2, "live", "text"), 0)]));
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].node.node_ref, 2);
}

#[test]
fn empty_page_collects_nothing() {
    assert!(collect(&[]).is_empty());
}

// =========================================================================
// Kind inference
// =========================================================================

#[test]
fn kind_follows_input_type_first() {
    let page = load_fixture("job_application.json");
    let fields = collect(&page);

    let kind_of = |node_ref: u32| {
        fields
            .iter()
            .find(|f| f.node.node_ref == node_ref)
            .map(|f| f.kind)
            .unwrap()
    };

    assert_eq!(kind_of(3), FieldKind::Email);
    assert_eq!(kind_of(4), FieldKind::Phone);
    assert_eq!(kind_of(5), FieldKind::File);
    assert_eq!(kind_of(9), FieldKind::Date);
    assert_eq!(kind_of(6), FieldKind::Select);
    assert_eq!(kind_of(10), FieldKind::Textarea);
}

#[test]
fn kind_falls_back_to_name_and_label_text() {
    let page = nodes(vec![
        input(1, "first_name", "text"),
        input(2, "last_name", "text"),
        with_label(input(3, "contact", "text"), "E-mail address"),
        input(4, "website_url", "text"),
    ]);
    let kinds: Vec<FieldKind> = page.iter().map(infer_kind).collect();

    assert_eq!(
        kinds,
        vec![
            FieldKind::FirstName,
            FieldKind::LastName,
            FieldKind::Email,
            FieldKind::Url,
        ]
    );
}
