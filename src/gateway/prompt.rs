use crate::fill::error::FillError;
use crate::page::field_model::FieldDescriptor;

/// Section markers in the fill prompt. The heuristic backend re-reads the
/// blocks between them, so both sides share these constants.
pub const FIELDS_MARKER: &str = "FIELDS:";
pub const CONTEXT_MARKER: &str = "CONTEXT:";
pub const RULES_MARKER: &str = "RULES:";

/// Build the prompt for one batch: instructions, the batch's descriptors as
/// a JSON array, and a bounded excerpt of the user context.
pub fn build_fill_prompt(
    fields: &[&FieldDescriptor],
    context: &str,
    context_limit: usize,
) -> Result<String, FillError> {
    let fields_json =
        serde_json::to_string_pretty(fields).map_err(|e| FillError::JsonSerialize {
            context: "prompt field descriptors".to_string(),
            source: e,
        })?;

    let excerpt: String = context.chars().take(context_limit).collect();

    Ok(format!(
        r#"You are filling out a web form on the user's behalf. Below are the form's
fields and a free-text context about the user (for example a resume). Infer a
value for each field you can fill from the context.

{fields_marker}
{fields_json}

{context_marker}
{excerpt}

{rules_marker}
- Respond with a JSON array of objects: {{"key": "...", "index": 0, "value": "...", "confidence": 0.9, "reason": "..."}}.
- "key" must echo the field's key exactly; "index" must echo its index.
- Split a full name into firstName and lastName fields when both exist.
- Extract email addresses and phone numbers verbatim from the context.
- Normalize dates to YYYY-MM-DD. Treat "Present" or "Current" as today's date.
- For select fields the value MUST be one of the listed option values.
- Omit any field you cannot fill with confidence.

Respond with ONLY valid JSON, no explanation."#,
        fields_marker = FIELDS_MARKER,
        context_marker = CONTEXT_MARKER,
        rules_marker = RULES_MARKER,
    ))
}

/// Slice the FIELDS block back out of a prompt. Used by the heuristic
/// backend, which receives the same prompt text the HTTP backend does.
pub fn extract_fields_block(prompt: &str) -> Option<&str> {
    let after = &prompt[prompt.find(FIELDS_MARKER)? + FIELDS_MARKER.len()..];
    let end = after.find(CONTEXT_MARKER)?;
    Some(after[..end].trim())
}

/// Slice the CONTEXT block back out of a prompt.
pub fn extract_context_block(prompt: &str) -> Option<&str> {
    let after = &prompt[prompt.find(CONTEXT_MARKER)? + CONTEXT_MARKER.len()..];
    match after.find(RULES_MARKER) {
        Some(end) => Some(after[..end].trim()),
        None => Some(after.trim()),
    }
}
