//! Backend error construction
//!
//! Turns a non-2xx response into an [`ApiFailure`]. The backend speaks
//! Django REST conventions: field-keyed validation maps, `error` objects
//! or strings, `detail`/`message` fallbacks. Construction itself never
//! fails; malformed or empty bodies degrade to a message built from the
//! status line.

use reqwest::StatusCode;
use serde_json::Value;
use vitrine_domain::utils::field_label;
use vitrine_domain::ApiFailure;

/// Body keys that carry error metadata rather than field validation.
const RESERVED_KEYS: [&str; 4] = ["error", "detail", "message", "code"];

/// Build a structured failure from a non-2xx response body.
pub(crate) fn failure_from_response(status: StatusCode, url: &str, body_text: &str) -> ApiFailure {
    let body = parse_body(body_text);

    let message = body
        .as_ref()
        .and_then(extract_message)
        .unwrap_or_else(|| generic_message(status));

    let code = body
        .as_ref()
        .and_then(|value| value.get("code"))
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP_{}", status.as_u16()), str::to_string);

    ApiFailure { message, code, status: status.as_u16(), url: url.to_string(), body }
}

fn parse_body(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Non-JSON bodies are still kept for inspection, as a plain string
    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string())))
}

fn extract_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    // Field-keyed validation errors take precedence over everything else
    let field_errors = collect_field_errors(
        object.iter().filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str())),
    );
    if !field_errors.is_empty() {
        return Some(field_errors.join("; "));
    }

    match object.get("error") {
        Some(Value::Object(nested)) => {
            let flattened = collect_field_errors(nested.iter());
            if !flattened.is_empty() {
                return Some(flattened.join("; "));
            }
        }
        Some(Value::String(text)) if !text.is_empty() => return Some(text.clone()),
        _ => {}
    }

    for key in ["message", "detail"] {
        if let Some(Value::String(text)) = object.get(key) {
            if !text.is_empty() {
                return Some(text.clone());
            }
        }
    }

    None
}

fn collect_field_errors<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Vec<String> {
    entries
        .filter_map(|(name, value)| {
            let messages: Vec<String> = match value {
                Value::String(text) if !text.is_empty() => vec![text.clone()],
                Value::Array(items) => {
                    items.iter().filter_map(Value::as_str).map(str::to_string).collect()
                }
                _ => Vec::new(),
            };

            if messages.is_empty() {
                None
            } else {
                Some(format!("{}: {}", field_label(name), messages.join(", ")))
            }
        })
        .collect()
}

fn generic_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}
