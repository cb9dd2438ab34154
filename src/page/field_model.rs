use serde::{Deserialize, Serialize};

use crate::page::page_model::{DomNode, SelectOption};

/// Semantic category of a field, inferred from its input type and
/// name/label text. Closed set; extend as new field roles show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Phone,
    FirstName,
    LastName,
    FullName,
    Date,
    Select,
    File,
    Number,
    Url,
    Password,
    Checkbox,
    Radio,
}

impl FieldKind {
    /// Wire token, as sent to and echoed back by the model.
    pub fn token(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::FirstName => "firstName",
            FieldKind::LastName => "lastName",
            FieldKind::FullName => "fullName",
            FieldKind::Date => "date",
            FieldKind::Select => "select",
            FieldKind::File => "file",
            FieldKind::Number => "number",
            FieldKind::Url => "url",
            FieldKind::Password => "password",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
        }
    }
}

/// Structural class of the underlying element. Content-editable and ARIA
/// textboxes carry the least structural information and sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Input,
    Textarea,
    Select,
    ContentEditable,
    AriaTextbox,
}

/// Position assigned to content-editable and ARIA-textbox elements, which
/// have no meaningful order within a form.
pub const ORDER_UNTRUSTED: u32 = 9999;

/// One collected, fillable page element. Ephemeral: valid only for the
/// extraction pass that produced it.
#[derive(Debug, Clone)]
pub struct FieldElement {
    pub node: DomNode,
    pub kind: FieldKind,
    pub control: ControlKind,
    /// Zero-based document-order index of the containing form, -1 if none.
    pub form_index: i32,
    /// Document-order counter within the form (or the standalone pool).
    pub order_within_form: u32,
}

/// Identity of the containing form, normalized for keying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub method: String,
}

/// Serializable, order-independent projection of a `FieldElement`.
///
/// `index` is the position in the current collection pass and is never
/// stable across passes; `key` is the content-derived identity that is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub index: usize,
    pub key: String,
    /// Bridge node reference; adapter-side addressing fallback only, not
    /// part of the stable key.
    #[serde(rename = "nodeRef", default)]
    pub node_ref: u32,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "parentLabels", default)]
    pub parent_labels: Vec<String>,
    #[serde(rename = "nearbyText", default)]
    pub nearby_text: Vec<String>,
    #[serde(rename = "cssPath", default)]
    pub css_path: String,
    #[serde(default)]
    pub form: FormIdentity,
    #[serde(rename = "formIndex")]
    pub form_index: i32,
    #[serde(rename = "orderWithinForm")]
    pub order_within_form: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl FieldDescriptor {
    /// Selector the page adapter should use to address this field: the CSS
    /// path when one was computed, otherwise the bridge's node reference.
    pub fn target(&self) -> FieldTarget {
        FieldTarget {
            node_ref: self.node_ref,
            css_path: if self.css_path.is_empty() {
                None
            } else {
                Some(self.css_path.clone())
            },
        }
    }
}

/// Addressing handle handed to the page adapter for fill/clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTarget {
    #[serde(rename = "nodeRef")]
    pub node_ref: u32,
    #[serde(rename = "cssPath", skip_serializing_if = "Option::is_none")]
    pub css_path: Option<String>,
}
