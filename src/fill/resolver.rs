use std::collections::HashMap;

use crate::gateway::parser::RawSuggestion;
use crate::page::descriptor::normalize;
use crate::page::field_model::FieldDescriptor;

/// Lookup tables mapping every identity a suggestion might echo back onto
/// a field index of the current collection pass. Built once per run;
/// first-collected field wins on duplicate identities.
pub struct ResolutionTable {
    by_key: HashMap<String, usize>,
    by_css_path: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    by_label: HashMap<String, usize>,
    by_position: HashMap<(i32, u32), usize>,
    field_count: usize,
}

impl ResolutionTable {
    pub fn build(descriptors: &[FieldDescriptor]) -> Self {
        let mut table = Self {
            by_key: HashMap::new(),
            by_css_path: HashMap::new(),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            by_label: HashMap::new(),
            by_position: HashMap::new(),
            field_count: descriptors.len(),
        };

        for d in descriptors {
            table.by_key.entry(d.key.clone()).or_insert(d.index);
            if !d.css_path.is_empty() {
                table.by_css_path.entry(d.css_path.clone()).or_insert(d.index);
            }
            if !d.id.is_empty() {
                table.by_id.entry(normalize(&d.id)).or_insert(d.index);
            }
            if !d.name.is_empty() {
                table.by_name.entry(normalize(&d.name)).or_insert(d.index);
            }
            if !d.label.is_empty() {
                table.by_label.entry(normalize(&d.label)).or_insert(d.index);
            }
            table
                .by_position
                .entry((d.form_index, d.order_within_form))
                .or_insert(d.index);
        }

        table
    }

    /// Map a suggestion to at most one field index. Models drift: some echo
    /// the stable key, some a CSS path or raw attribute in the key slot,
    /// some only positions. The chain tries identities from most to least
    /// trustworthy; the `key` always outranks the `index` when both are
    /// present and disagree.
    pub fn resolve(&self, suggestion: &RawSuggestion) -> Option<usize> {
        if let Some(key) = suggestion.key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            if let Some(&index) = self.by_key.get(key) {
                return Some(index);
            }
            if let Some(&index) = self.by_css_path.get(key) {
                return Some(index);
            }
            let normalized = normalize(key);
            if let Some(&index) = self.by_id.get(&normalized) {
                return Some(index);
            }
            if let Some(&index) = self.by_name.get(&normalized) {
                return Some(index);
            }
            if let Some(&index) = self.by_label.get(&normalized) {
                return Some(index);
            }
        }

        if let (Some(form_index), Some(order)) = (
            suggestion.form_index.and_then(|v| i32::try_from(v).ok()),
            suggestion.order_within_form.and_then(|v| u32::try_from(v).ok()),
        ) {
            if let Some(&index) = self.by_position.get(&(form_index, order)) {
                return Some(index);
            }
        }

        match suggestion.index {
            Some(index) if index >= 0 && (index as usize) < self.field_count => {
                Some(index as usize)
            }
            _ => None,
        }
    }
}
