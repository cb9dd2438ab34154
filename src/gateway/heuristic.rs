use std::time::Duration;

use serde_json::{Value, json};

use crate::gateway::error::GatewayError;
use crate::gateway::gateway::{GatewayCapabilities, ModelGateway, SessionOptions};
use crate::gateway::prompt::{extract_context_block, extract_fields_block};
use crate::page::field_model::{FieldDescriptor, FieldKind};

/// Pattern-matching fallback backend. No network: it re-reads the FIELDS
/// and CONTEXT blocks out of the prompt and answers with the same JSON
/// contract the HTTP backend's model is instructed to use, so the whole
/// prompt → parse → resolve pipeline is exercised identically.
pub struct HeuristicGateway;

impl ModelGateway for HeuristicGateway {
    fn capabilities(&self) -> Result<GatewayCapabilities, GatewayError> {
        Ok(GatewayCapabilities {
            available: true,
            model: "heuristic".to_string(),
        })
    }

    fn create_session(&self, _options: &SessionOptions) -> Result<String, GatewayError> {
        Ok("heuristic".to_string())
    }

    fn prompt(
        &self,
        _session_id: &str,
        text: &str,
        _timeout: Duration,
    ) -> Result<String, GatewayError> {
        let fields_json = extract_fields_block(text).ok_or_else(|| {
            GatewayError::MalformedResponse("prompt carries no FIELDS block".to_string())
        })?;
        let fields: Vec<FieldDescriptor> =
            serde_json::from_str(fields_json).map_err(|e| {
                GatewayError::MalformedResponse(format!("unreadable FIELDS block: {}", e))
            })?;
        let context = extract_context_block(text).unwrap_or_default();

        let suggestions = suggest(&fields, context);
        serde_json::to_string(&Value::Array(suggestions))
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))
    }

    fn destroy(&self, _session_id: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}

fn suggest(fields: &[FieldDescriptor], context: &str) -> Vec<Value> {
    let name = extract_name(context);
    let mut out = Vec::new();

    for field in fields {
        let value = match field.kind {
            FieldKind::Email => extract_email(context),
            FieldKind::Phone => extract_phone(context),
            FieldKind::FirstName => name.as_ref().map(|(first, _)| first.clone()),
            FieldKind::LastName => name.as_ref().map(|(_, last)| last.clone()),
            FieldKind::FullName => {
                name.as_ref().map(|(first, last)| format!("{} {}", first, last))
            }
            FieldKind::Url => extract_url(context),
            FieldKind::Select => select_from_context(field, context),
            _ => None,
        };

        if let Some(value) = value {
            out.push(json!({
                "key": field.key,
                "index": field.index,
                "value": value,
                "confidence": 0.8,
                "reason": "matched from context",
            }));
        }
    }

    out
}

// ============================================================================
// Context probes
// ============================================================================

/// First token that looks like an email address.
pub fn extract_email(context: &str) -> Option<String> {
    context
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '@' && c != '.'))
        .find(|t| {
            let Some(at) = t.find('@') else { return false };
            at > 0 && t[at + 1..].contains('.')
        })
        .map(str::to_string)
}

/// First run of phone-looking characters with at least 7 digits.
pub fn extract_phone(context: &str) -> Option<String> {
    let is_phone_char = |c: char| c.is_ascii_digit() || "+-() .".contains(c);

    let mut run = String::new();
    for c in context.chars() {
        if is_phone_char(c) {
            run.push(c);
        } else {
            if digit_count(&run) >= 7 {
                break;
            }
            run.clear();
        }
    }
    if digit_count(&run) >= 7 {
        Some(run.trim_matches(|c: char| !c.is_ascii_digit() && c != '+').to_string())
    } else {
        None
    }
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// First and last name from the head of the context, skipping honorifics.
pub fn extract_name(context: &str) -> Option<(String, String)> {
    const HONORIFICS: [&str; 6] = ["mr", "mrs", "ms", "mx", "dr", "prof"];

    let words: Vec<String> = context
        .split_whitespace()
        .take(8)
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()).to_string())
        .filter(|w| !w.is_empty())
        .filter(|w| !HONORIFICS.contains(&w.to_lowercase().as_str()))
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .filter(|w| !w.contains('@'))
        .collect();

    match words.as_slice() {
        [first, last, ..] => Some((first.clone(), last.clone())),
        _ => None,
    }
}

/// First token that looks like a URL.
pub fn extract_url(context: &str) -> Option<String> {
    context
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c == ',' || c == ';' || c == ')'))
        .find(|t| t.starts_with("http://") || t.starts_with("https://") || t.starts_with("www."))
        .map(str::to_string)
}

/// Pick the select option whose text or value appears in the context.
/// Short tokens only count as whole words, so "no" never matches inside
/// "nothing".
fn select_from_context(field: &FieldDescriptor, context: &str) -> Option<String> {
    let lower = context.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .collect();

    field
        .options
        .iter()
        .filter(|o| !o.value.is_empty())
        .find(|o| {
            let text = o.text.trim().to_lowercase();
            let value = o.value.to_lowercase();
            (text.len() >= 4 && lower.contains(&text))
                || words.iter().any(|w| *w == value)
        })
        .map(|o| o.value.clone())
}
