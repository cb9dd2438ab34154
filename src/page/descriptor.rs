use sha1::{Digest, Sha1};

use crate::page::field_model::{FieldDescriptor, FieldElement, FormIdentity};
use crate::page::page_model::DomNode;

/// Build the serializable descriptor for one collected field.
///
/// Pure function of the element's extracted state; `index` is the field's
/// position in the current collection pass.
pub fn describe(field: &FieldElement, index: usize) -> FieldDescriptor {
    let node = &field.node;
    let label = resolve_label(node);
    let css_path = css_path(node);

    let form = node
        .form
        .as_ref()
        .map(|f| FormIdentity {
            id: f.id.clone().unwrap_or_default(),
            name: f.name.clone().unwrap_or_default(),
            action: f.action.clone().unwrap_or_default(),
            method: f.method.clone().unwrap_or_default(),
        })
        .unwrap_or_default();

    let parent_labels: Vec<String> = node
        .parent_labels
        .iter()
        .take(3)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let nearby_text: Vec<String> = node
        .nearby_text
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let key = stable_key(
        field,
        &label,
        &form,
        &parent_labels,
        &nearby_text,
        &css_path,
    );

    FieldDescriptor {
        index,
        key,
        node_ref: node.node_ref,
        kind: field.kind,
        tag: node.tag.clone(),
        id: node.id.clone().unwrap_or_default(),
        name: node.name.clone().unwrap_or_default(),
        label,
        placeholder: node
            .placeholder
            .clone()
            .or_else(|| node.data_placeholder.clone())
            .unwrap_or_default(),
        required: node.required,
        parent_labels,
        nearby_text,
        css_path,
        form,
        form_index: field.form_index,
        order_within_form: field.order_within_form,
        options: node.options.clone(),
    }
}

// ============================================================================
// Label resolution
// ============================================================================

/// Resolve the human-facing label for a node, best source first:
/// `<label for=id>` → enclosing `<label>` → aria-label → aria-labelledby
/// target text → placeholder → name → empty.
pub fn resolve_label(node: &DomNode) -> String {
    for candidate in [
        node.label_for_text.as_deref(),
        node.enclosing_label_text.as_deref(),
        node.aria_label.as_deref(),
        node.aria_labelledby_text.as_deref(),
        node.placeholder.as_deref(),
        node.data_placeholder.as_deref(),
        node.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    String::new()
}

// ============================================================================
// CSS path
// ============================================================================

/// Best-effort unique selector. A page-unique id wins outright; otherwise
/// the ancestor chain is joined into `tag[#id|.class×≤2]:nth-of-type(n)`
/// segments, anchored at the nearest ancestor with an id. Degrades to an
/// empty string when the extraction carried no structural chain — the path
/// is advisory, never required for correctness.
pub fn css_path(node: &DomNode) -> String {
    if let Some(id) = node.id.as_deref() {
        if node.id_unique && !id.is_empty() {
            return format!("#{}", id);
        }
    }

    if node.ancestors.is_empty() && node.id.is_none() {
        return String::new();
    }

    let mut segments: Vec<String> = Vec::new();

    // Ancestors arrive nearest-first; walk outward until an id anchors us.
    for seg in &node.ancestors {
        match seg.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                segments.push(format!("{}#{}", seg.tag, id));
                break;
            }
            None => {
                let classes: String = seg
                    .classes
                    .iter()
                    .take(2)
                    .map(|c| format!(".{}", c))
                    .collect();
                segments.push(format!("{}{}:nth-of-type({})", seg.tag, classes, seg.nth_of_type));
            }
        }
    }
    segments.reverse();

    let own = match node.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => format!("{}#{}", node.tag, id),
        None => {
            let classes: String = node
                .classes
                .iter()
                .take(2)
                .map(|c| format!(".{}", c))
                .collect();
            format!("{}{}:nth-of-type({})", node.tag, classes, node.nth_of_type)
        }
    };
    segments.push(own);

    segments.join(" > ")
}

// ============================================================================
// Stable key
// ============================================================================

/// Lowercase and collapse runs of whitespace. Shared with the resolver so
/// key composites and match lookups normalize identically.
pub fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Content-derived identity for a field: SHA-1 over the normalized
/// structural composite, truncated. Deterministic for identical structure
/// across independent collection passes; the pass-local `index` never
/// participates. An identity tag, not a security primitive.
fn stable_key(
    field: &FieldElement,
    label: &str,
    form: &FormIdentity,
    parent_labels: &[String],
    nearby_text: &[String],
    css_path: &str,
) -> String {
    let node = &field.node;
    let parts = [
        field.kind.token().to_string(),
        node.tag.clone(),
        node.id.clone().unwrap_or_default(),
        node.name.clone().unwrap_or_default(),
        label.to_string(),
        node.placeholder.clone().unwrap_or_default(),
        form.id.clone(),
        form.name.clone(),
        form.action.clone(),
        form.method.clone(),
        field.form_index.to_string(),
        field.order_within_form.to_string(),
        parent_labels.join(" "),
        nearby_text.join(" "),
        css_path.to_string(),
    ];

    let composite = parts
        .iter()
        .map(|p| normalize(p))
        .collect::<Vec<_>>()
        .join("|");

    let mut hasher = Sha1::new();
    hasher.update(composite.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("f_{}", &digest[..12])
}
