// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bulk request bodies.
//!
//! ```text
//! [
//!   {"index": {"_id": id, "_index": name}},  {field: [values], ...},
//!   {"delete": {"_id": id, "_index": name}},
//! ]
//! ```

use serde_json::{json, Map, Value};

use crate::item::{IndexItem, ItemField};
use crate::schema::{FieldType, SEARCH_API_BOOST, SEARCH_API_DATASOURCE, SEARCH_API_ID, SEARCH_API_LANGUAGE};

/// Smallest boost the engine accepts for a rank feature.
pub const MIN_BOOST: f64 = 0.1;

/// Document line for one item: its non-empty fields followed by the
/// synthetic id, datasource, language and boost.
pub fn document(item: &IndexItem) -> Map<String, Value> {
    let mut doc = Map::new();

    for (field_id, field) in &item.fields {
        if field.values.is_empty() {
            continue;
        }
        doc.insert(field_id.clone(), Value::Array(coerce_values(field)));
    }

    doc.insert(SEARCH_API_ID.into(), json!([item.id]));
    doc.insert(SEARCH_API_DATASOURCE.into(), json!([item.datasource]));
    doc.insert(SEARCH_API_LANGUAGE.into(), json!([item.language]));
    doc.insert(SEARCH_API_BOOST.into(), json!([clamp_boost(item.boost)]));

    doc
}

fn clamp_boost(boost: f64) -> f64 {
    if boost.is_nan() {
        MIN_BOOST
    } else {
        boost.max(MIN_BOOST)
    }
}

fn coerce_values(field: &ItemField) -> Vec<Value> {
    field
        .values
        .iter()
        .map(|value| match &field.field_type {
            t if t.is_string_like() => match value {
                Value::String(_) => value.clone(),
                Value::Null => Value::String(String::new()),
                other => Value::String(other.to_string()),
            },
            FieldType::Boolean => Value::Bool(truthy(value)),
            FieldType::DateRange => date_range(value),
            _ => value.clone(),
        })
        .collect()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// `{start, end}` (or `[start, end]`) to `{gte, lte}`.
fn date_range(value: &Value) -> Value {
    match value {
        Value::Object(map) if map.contains_key("gte") || map.contains_key("lte") => value.clone(),
        Value::Object(map) => json!({
            "gte": map.get("start").or_else(|| map.get("value")).cloned().unwrap_or(Value::Null),
            "lte": map.get("end").or_else(|| map.get("end_value")).cloned().unwrap_or(Value::Null),
        }),
        Value::Array(bounds) if bounds.len() == 2 => json!({"gte": bounds[0], "lte": bounds[1]}),
        other => other.clone(),
    }
}

/// Bulk body indexing `items` into `index_name`.
pub fn bulk_index_body(index_name: &str, items: &[IndexItem]) -> Vec<Value> {
    let mut body = Vec::with_capacity(items.len() * 2);
    for item in items {
        body.push(json!({"index": {"_id": item.id, "_index": index_name}}));
        body.push(Value::Object(document(item)));
    }
    body
}

/// Bulk body deleting `ids` from `index_name`.
pub fn bulk_delete_body(index_name: &str, ids: &[String]) -> Vec<Value> {
    ids.iter()
        .map(|id| json!({"delete": {"_id": id, "_index": index_name}}))
        .collect()
}
