//! Parse AI output into knowledge records
//!
//! Only document-level defects fail: no bracketed array, malformed JSON, or
//! a non-array value. Defects in individual elements degrade to defaults.

use crate::error::ParseError;
use lorekeeper_domain::{Category, Importance, KnowledgeRecord};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Title used when an element has none
pub const UNTITLED: &str = "Untitled";

/// Parse an AI response into records tagged with `source_label`
pub fn parse_llm_response(
    response: &str,
    source_label: &str,
) -> Result<Vec<KnowledgeRecord>, ParseError> {
    let json_str = extract_json_array(response)?;

    let json: Value =
        serde_json::from_str(json_str).map_err(|e| ParseError::MalformedJson(e.to_string()))?;

    let items = json.as_array().ok_or(ParseError::NotAnArray)?;

    let records: Vec<KnowledgeRecord> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| record_from_json(idx, item, source_label))
        .collect();

    debug!("Parsed {} records from {}", records.len(), source_label);
    Ok(records)
}

/// Slice from the first `[` to the last `]`
///
/// Handles prose or markdown fences around the array.
fn extract_json_array(response: &str) -> Result<&str, ParseError> {
    let start = response.find('[').ok_or(ParseError::Format)?;
    let end = response.rfind(']').ok_or(ParseError::Format)?;
    if end < start {
        return Err(ParseError::Format);
    }
    Ok(&response[start..=end])
}

/// Build a record from one array element, defaulting whatever is missing
fn record_from_json(idx: usize, item: &Value, source_label: &str) -> KnowledgeRecord {
    let empty = Map::new();
    let obj = match item.as_object() {
        Some(obj) => obj,
        None => {
            warn!("Element {} from {} is not an object; using defaults", idx, source_label);
            &empty
        }
    };

    let title = string_field(obj, "title")
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string());

    let content = string_field(obj, "content").unwrap_or_default().to_string();

    let category = Category::from_label_or_default(string_field(obj, "category"));
    let importance = Importance::from_label_or_default(string_field(obj, "importance"));

    let keywords = obj
        .get("keywords")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|k| match k {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default();

    KnowledgeRecord::new(title, content, category, keywords, importance, source_label)
}

fn string_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}
