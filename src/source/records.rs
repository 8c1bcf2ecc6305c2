//! Loosely-typed record extraction
//!
//! Sources answer with either a bare JSON array of records or an envelope of
//! the form `{ "success": true, "data": [...] }`. Only `id` (or `_id`),
//! `title` and an optional numeric `number` are read from each record.

use crate::chapters::ChapterEntry;
use crate::crawler::Entity;
use serde_json::Value;

/// Unwraps the record list from a response body
///
/// Anything that is neither an array nor a successful envelope yields no records.
pub fn extract_records(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) if map.get("success") == Some(&Value::Bool(true)) => {
            match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Reads the record id as a string; integer ids are accepted
fn record_id(record: &Value) -> Option<String> {
    let value = record.get("id").or_else(|| record.get("_id"))?;
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_title(record: &Value) -> String {
    record
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Reads the structured chapter number; numeric strings count, anything else is absent
fn record_number(record: &Value) -> Option<f64> {
    match record.get("number")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Builds an entity from a search record, or `None` if the record has no id
pub fn entity_from_record(record: &Value) -> Option<Entity> {
    Some(Entity::new(record_id(record)?, record_title(record)))
}

/// Builds a chapter from a chapter record, or `None` if the record has no id
pub fn chapter_from_record(record: &Value) -> Option<ChapterEntry> {
    Some(
        ChapterEntry::new(record_id(record)?, record_title(record))
            .with_number_field(record_number(record)),
    )
}

/// Converts every record with an id, logging how many were skipped
pub(crate) fn convert_records<T>(
    records: Vec<Value>,
    kind: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Vec<T> {
    let total = records.len();
    let converted: Vec<T> = records.iter().filter_map(convert).collect();
    if converted.len() < total {
        tracing::debug!(
            kind,
            skipped = total - converted.len(),
            total,
            "Skipped records without an id"
        );
    }
    converted
}
