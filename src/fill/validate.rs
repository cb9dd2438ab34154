use std::collections::BTreeMap;

use crate::fill::dates::normalize_date;
use crate::page::descriptor::normalize;
use crate::page::field_model::{FieldDescriptor, FieldKind};

/// Fallback values for field roles that some forms require but models often
/// omit. The built-in table encodes one observed job-application form; it
/// is a policy value, not a contract — config can override or extend it.
#[derive(Debug, Clone)]
pub struct DefaultPolicy {
    rules: Vec<DefaultRule>,
}

#[derive(Debug, Clone)]
pub struct DefaultRule {
    /// Role pattern matched against the field's normalized name and id.
    pub role: String,
    /// Candidate values, tried in order against the field's options.
    pub candidates: Vec<String>,
    /// Whether the first non-empty option is an acceptable last resort.
    pub first_option_fallback: bool,
}

impl DefaultPolicy {
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                DefaultRule {
                    role: "source".to_string(),
                    candidates: vec!["search_engine".to_string(), "other".to_string()],
                    first_option_fallback: false,
                },
                DefaultRule {
                    role: "work_authorization".to_string(),
                    candidates: vec!["yes".to_string()],
                    first_option_fallback: false,
                },
                DefaultRule {
                    role: "position".to_string(),
                    candidates: vec!["software_engineer".to_string()],
                    first_option_fallback: true,
                },
            ],
        }
    }

    /// Built-in rules with config-supplied overrides layered on top. An
    /// override for an existing role replaces its candidates; a new role is
    /// appended.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Self {
        let mut policy = Self::builtin();
        for (role, candidates) in overrides {
            match policy.rules.iter_mut().find(|r| r.role == *role) {
                Some(rule) => rule.candidates = candidates.clone(),
                None => policy.rules.push(DefaultRule {
                    role: role.clone(),
                    candidates: candidates.clone(),
                    first_option_fallback: false,
                }),
            }
        }
        policy
    }

    /// The rule whose role pattern matches this field's name or id.
    pub fn rule_for(&self, descriptor: &FieldDescriptor) -> Option<&DefaultRule> {
        let name = role_text(&descriptor.name);
        let id = role_text(&descriptor.id);
        self.rules
            .iter()
            .find(|r| name.contains(&r.role) || id.contains(&r.role))
    }

    /// Default value for a field under a rule: candidates matched against
    /// the field's options (select fields), the first candidate verbatim
    /// (free-text fields), or the rule's first-option fallback.
    pub fn default_value(&self, rule: &DefaultRule, descriptor: &FieldDescriptor) -> Option<String> {
        if descriptor.options.is_empty() {
            return rule.candidates.first().cloned();
        }

        for candidate in &rule.candidates {
            if let Some(value) = match_option(descriptor, candidate) {
                return Some(value);
            }
        }

        if rule.first_option_fallback {
            return descriptor
                .options
                .iter()
                .find(|o| !o.value.trim().is_empty())
                .map(|o| o.value.clone());
        }

        None
    }
}

/// Normalize a name/id for role matching: lowercase, separators unified.
fn role_text(s: &str) -> String {
    normalize(s).replace(['-', ' '], "_")
}

/// Case-insensitive match of a value against a select field's options, by
/// option value first, then by display text. Returns the canonical option
/// value.
pub fn match_option(descriptor: &FieldDescriptor, value: &str) -> Option<String> {
    let wanted = normalize(value);
    descriptor
        .options
        .iter()
        .find(|o| normalize(&o.value) == wanted || normalize(&o.text) == wanted)
        .map(|o| o.value.clone())
}

/// Validate and coerce one suggested value for one field. `None` means the
/// suggestion is discarded (the field stays unfilled).
pub fn validate_value(
    descriptor: &FieldDescriptor,
    raw: &str,
    policy: &DefaultPolicy,
) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match descriptor.kind {
        FieldKind::Date => normalize_date(trimmed),
        FieldKind::Select => match_option(descriptor, trimmed).or_else(|| {
            policy
                .rule_for(descriptor)
                .and_then(|rule| policy.default_value(rule, descriptor))
        }),
        _ => Some(trimmed.to_string()),
    }
}

/// Clamp an untrusted confidence into [0, 1]; missing becomes 0.5.
pub fn clamp_confidence(confidence: Option<f64>) -> f64 {
    confidence.unwrap_or(0.5).clamp(0.0, 1.0)
}
