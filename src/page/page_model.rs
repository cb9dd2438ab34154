use serde::Deserialize;

/// One element record as emitted by the extraction bridge (or a snapshot
/// file): a flat projection of the live DOM node plus the structural context
/// the descriptor builder needs (resolved label texts, ancestor chain,
/// sibling text). Field names mirror the bridge's camelCase wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct DomNode {
    /// Unique within one extraction pass; assigned by the bridge.
    #[serde(rename = "nodeRef")]
    pub node_ref: u32,
    pub tag: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    pub value: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "ariaLabel")]
    pub aria_label: Option<String>,
    /// Text content of the element referenced by aria-labelledby, resolved
    /// bridge-side.
    #[serde(rename = "ariaLabelledbyText")]
    pub aria_labelledby_text: Option<String>,
    #[serde(rename = "contentEditable", default)]
    pub content_editable: bool,
    #[serde(rename = "dataPlaceholder")]
    pub data_placeholder: Option<String>,
    /// Text of a `<label for=...>` pointing at this element.
    #[serde(rename = "labelForText")]
    pub label_for_text: Option<String>,
    /// Text nodes of an enclosing `<label>`.
    #[serde(rename = "enclosingLabelText")]
    pub enclosing_label_text: Option<String>,
    /// Up to 3 ancestor levels of label/heading text.
    #[serde(rename = "parentLabels", default)]
    pub parent_labels: Vec<String>,
    /// Immediate sibling text content.
    #[serde(rename = "nearbyText", default)]
    pub nearby_text: Vec<String>,
    pub form: Option<FormRef>,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Whether `id` is unique on the page (checked bridge-side).
    #[serde(rename = "idUnique", default)]
    pub id_unique: bool,
    #[serde(default)]
    pub classes: Vec<String>,
    /// 1-based :nth-of-type position among same-tag siblings.
    #[serde(rename = "nthOfType", default = "default_nth")]
    pub nth_of_type: u32,
    /// Ancestor chain from the element's parent up to (not including) the
    /// document root, nearest first. Used only for CSS path building.
    #[serde(default)]
    pub ancestors: Vec<AncestorSegment>,
}

/// Identity of the containing `<form>`, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct FormRef {
    /// Zero-based position of the form element in document order.
    pub index: i32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct SelectOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AncestorSegment {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// 1-based :nth-of-type position among same-tag siblings.
    #[serde(rename = "nthOfType", default = "default_nth")]
    pub nth_of_type: u32,
}

fn default_nth() -> u32 {
    1
}
