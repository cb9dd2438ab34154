use std::collections::{HashMap, HashSet};

use crate::page::field_model::{ControlKind, FieldElement, FieldKind, ORDER_UNTRUSTED};
use crate::page::page_model::DomNode;

/// Minimum bounding-box side for an element to count as visible.
const MIN_VISIBLE_PX: f64 = 5.0;

/// Collect fillable fields from one extraction pass, in a stable order:
/// form controls grouped by form (document order within each form), then
/// standalone controls, then content-editable elements, then ARIA-textbox
/// candidates. Each node is taken at most once across passes.
///
/// Zero results means "nothing to fill" and is not an error.
pub fn collect(nodes: &[DomNode]) -> Vec<FieldElement> {
    let mut seen: HashSet<u32> = HashSet::new();
    let mut fields: Vec<FieldElement> = Vec::new();

    // ---- Pass 1: controls inside a form, grouped by form index ----
    let mut form_indices: Vec<i32> = nodes
        .iter()
        .filter(|n| is_fillable_control(n))
        .filter_map(|n| n.form.as_ref().map(|f| f.index))
        .collect();
    form_indices.sort_unstable();
    form_indices.dedup();

    let mut per_form_counter: HashMap<i32, u32> = HashMap::new();
    for form_index in form_indices {
        for node in nodes {
            let belongs = node.form.as_ref().is_some_and(|f| f.index == form_index);
            if !belongs || !is_fillable_control(node) || !seen.insert(node.node_ref) {
                continue;
            }
            let counter = per_form_counter.entry(form_index).or_insert(0);
            fields.push(make_field(node, form_index, *counter));
            *counter += 1;
        }
    }

    // ---- Pass 2: controls outside any form ----
    let mut standalone_counter: u32 = 0;
    for node in nodes {
        if node.form.is_some() || !is_fillable_control(node) || !seen.insert(node.node_ref) {
            continue;
        }
        fields.push(make_field(node, -1, standalone_counter));
        standalone_counter += 1;
    }

    // ---- Pass 3: content-editable elements ----
    for node in nodes {
        if !node.content_editable || !seen.insert(node.node_ref) {
            continue;
        }
        fields.push(FieldElement {
            node: node.clone(),
            kind: infer_kind(node),
            control: ControlKind::ContentEditable,
            form_index: node.form.as_ref().map_or(-1, |f| f.index),
            order_within_form: ORDER_UNTRUSTED,
        });
    }

    // ---- Pass 4: ARIA-textbox-like candidates ----
    for node in nodes {
        if !is_aria_textbox(node) || !seen.insert(node.node_ref) {
            continue;
        }
        fields.push(FieldElement {
            node: node.clone(),
            kind: infer_kind(node),
            control: ControlKind::AriaTextbox,
            form_index: node.form.as_ref().map_or(-1, |f| f.index),
            order_within_form: ORDER_UNTRUSTED,
        });
    }

    // ---- Visibility filter ----
    fields.retain(|f| {
        !f.node.disabled
            && f.node.rect.width > MIN_VISIBLE_PX
            && f.node.rect.height > MIN_VISIBLE_PX
    });

    fields
}

fn make_field(node: &DomNode, form_index: i32, order_within_form: u32) -> FieldElement {
    FieldElement {
        node: node.clone(),
        kind: infer_kind(node),
        control: control_kind(node),
        form_index,
        order_within_form,
    }
}

fn control_kind(node: &DomNode) -> ControlKind {
    match node.tag.as_str() {
        "textarea" => ControlKind::Textarea,
        "select" => ControlKind::Select,
        _ => ControlKind::Input,
    }
}

/// Native form controls that can receive a typed or selected value.
/// Submit/button/reset/image/hidden inputs are chrome, not fields.
fn is_fillable_control(node: &DomNode) -> bool {
    match node.tag.as_str() {
        "textarea" | "select" => true,
        "input" => !matches!(
            node.input_type.as_deref(),
            Some("hidden") | Some("submit") | Some("button") | Some("reset") | Some("image")
        ),
        _ => false,
    }
}

/// Elements that behave like textboxes without being form controls:
/// role=textbox, or carrying aria-label / data-placeholder hints.
fn is_aria_textbox(node: &DomNode) -> bool {
    if matches!(node.tag.as_str(), "input" | "textarea" | "select") {
        return false;
    }
    node.role.as_deref() == Some("textbox")
        || node.aria_label.is_some()
        || node.data_placeholder.is_some()
}

// ============================================================================
// Semantic kind inference
// ============================================================================

/// Classify a node's semantic field kind: the input type is the most
/// reliable signal, then name/id/label text heuristics.
pub fn infer_kind(node: &DomNode) -> FieldKind {
    if node.tag == "select" {
        return FieldKind::Select;
    }

    if let Some(t) = node.input_type.as_deref() {
        match t {
            "email" => return FieldKind::Email,
            "tel" => return FieldKind::Phone,
            "date" | "datetime-local" | "datetime" | "month" => return FieldKind::Date,
            "file" => return FieldKind::File,
            "number" => return FieldKind::Number,
            "url" => return FieldKind::Url,
            "password" => return FieldKind::Password,
            "checkbox" => return FieldKind::Checkbox,
            "radio" => return FieldKind::Radio,
            _ => {}
        }
    }

    let hint = kind_hint_text(node);

    if hint.contains("email") || hint.contains("e-mail") {
        return FieldKind::Email;
    }
    if hint.contains("phone") || hint.contains("mobile") || hint.contains("tel") {
        return FieldKind::Phone;
    }
    if hint.contains("first_name") || hint.contains("firstname") || hint.contains("first name")
        || hint.contains("fname") || hint.contains("given")
    {
        return FieldKind::FirstName;
    }
    if hint.contains("last_name") || hint.contains("lastname") || hint.contains("last name")
        || hint.contains("lname") || hint.contains("surname") || hint.contains("family")
    {
        return FieldKind::LastName;
    }
    if hint.contains("full_name") || hint.contains("full name") || hint.contains("your name") {
        return FieldKind::FullName;
    }
    if hint.contains("date") || hint.contains("birthday") || hint.contains("dob") {
        return FieldKind::Date;
    }
    if hint.contains("website") || hint.contains("url") || hint.contains("linkedin") {
        return FieldKind::Url;
    }

    match node.tag.as_str() {
        "textarea" => FieldKind::Textarea,
        _ => FieldKind::Text,
    }
}

fn kind_hint_text(node: &DomNode) -> String {
    let mut hint = String::new();
    for part in [
        node.name.as_deref(),
        node.id.as_deref(),
        node.placeholder.as_deref(),
        node.label_for_text.as_deref(),
        node.enclosing_label_text.as_deref(),
        node.aria_label.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        hint.push_str(&part.to_lowercase());
        hint.push(' ');
    }
    hint
}
