use serde_json::Value;

/// One untrusted model suggestion, loosely typed. Every field is optional;
/// coercion and validation happen at resolution time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSuggestion {
    pub key: Option<String>,
    pub index: Option<i64>,
    pub value: Option<String>,
    pub confidence: Option<f64>,
    pub reason: Option<String>,
    /// Positional echo some models produce instead of key/index.
    pub form_index: Option<i64>,
    pub order_within_form: Option<i64>,
}

/// Extract suggestions from arbitrary model output. Never fails: malformed
/// input degrades to fewer or zero suggestions.
///
/// Attempts, in order: chat-completion envelope unwrap, BOM strip, code
/// fence strip, direct JSON-array parse, and finally a character scan that
/// pulls every complete top-level `{...}` out of a truncated array.
pub fn parse_suggestions(raw: &str) -> Vec<RawSuggestion> {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();

    // A fully well-formed reply parses in one shot. If it is a completion
    // envelope, unwrap the inner content and start over on that.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_array() {
            return coerce_array(&value);
        }
        if let Some(content) = value["choices"][0]["message"]["content"].as_str() {
            return parse_suggestions(content);
        }
    }

    let cleaned = strip_code_fence(trimmed);

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        if value.is_array() {
            return coerce_array(&value);
        }
    }

    salvage_objects(cleaned)
}

/// Cut the content out of a markdown code fence, tolerating prose around
/// it and a language tag after the opening backticks.
fn strip_code_fence(s: &str) -> &str {
    let Some(open) = s.find("```") else {
        return s;
    };
    let after_ticks = &s[open + 3..];
    // Drop the language tag line ("json", "js", ...), if any.
    let body = match after_ticks.find('\n') {
        Some(nl) => &after_ticks[nl + 1..],
        None => after_ticks,
    };
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Scan for complete top-level objects inside the outermost `[`, respecting
/// string literals and backslash escapes. Objects that fail to parse on
/// their own are skipped, so a truncated trailing object costs only itself.
fn salvage_objects(s: &str) -> Vec<RawSuggestion> {
    let Some(start) = s.find('[') else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut object_start: Option<usize> = None;

    for (offset, c) in s[start..].char_indices() {
        let pos = start + offset;

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    object_start = Some(pos);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(obj_start) = object_start.take() {
                            if let Ok(value) =
                                serde_json::from_str::<Value>(&s[obj_start..=pos])
                            {
                                if let Some(suggestion) = coerce_object(&value) {
                                    out.push(suggestion);
                                }
                            }
                        }
                    }
                }
            }
            ']' if depth == 0 => break,
            _ => {}
        }
    }

    out
}

fn coerce_array(value: &Value) -> Vec<RawSuggestion> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(coerce_object).collect())
        .unwrap_or_default()
}

/// Coerce one JSON object into a suggestion. Values are stringified from
/// strings, numbers, and booleans; anything else stays unset.
fn coerce_object(value: &Value) -> Option<RawSuggestion> {
    let obj = value.as_object()?;

    let key = obj.get("key").and_then(Value::as_str).map(str::to_string);

    let index = obj.get("index").and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    });

    let coerced_value = obj.get("value").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    });

    let confidence = obj.get("confidence").and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });

    let reason = obj.get("reason").and_then(Value::as_str).map(str::to_string);

    let as_count = |v: &Value| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let form_index = obj.get("formIndex").and_then(&as_count);
    let order_within_form = obj.get("orderWithinForm").and_then(&as_count);

    Some(RawSuggestion {
        key,
        index,
        value: coerced_value,
        confidence,
        reason,
        form_index,
        order_within_form,
    })
}
