// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Mapping reconciliation.
//!
//! The engine infers a type for any field it has not been told about and
//! refuses to change the type of a populated field. Adding a field is
//! therefore a plain mapping update, while changing an existing field's
//! shape requires dropping and rebuilding the index.
//!
//! # Comparison rules
//!
//! - Only fields present in both mappings are compared.
//! - Within a shared field, every key of the desired descriptor must exist
//!   in the live descriptor with an equal value, recursively.
//! - Keys only the live descriptor carries are ignored.
//! - Integers and floats are distinct leaves, and `1.0` stays a float.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Closed recursive value type used for mapping comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<MappingValue>),
    Map(IndexMap<String, MappingValue>),
}

impl From<&Value> for MappingValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .unwrap_or_else(|| Self::Float(n.as_f64().unwrap_or_default())),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Map<String, Value>> for MappingValue {
    fn from(map: &Map<String, Value>) -> Self {
        Self::Map(map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
    }
}

impl MappingValue {
    /// Whether every part of `self` is present and equal in `live`.
    ///
    /// Maps are compared key by key over `self`'s keys; lists must match
    /// element for element.
    pub fn is_covered_by(&self, live: &MappingValue) -> bool {
        match (self, live) {
            (Self::Map(desired), Self::Map(live)) => desired
                .iter()
                .all(|(key, value)| live.get(key).is_some_and(|l| value.is_covered_by(l))),
            (Self::List(desired), Self::List(live)) => {
                desired.len() == live.len()
                    && desired.iter().zip(live).all(|(d, l)| d.is_covered_by(l))
            }
            (a, b) => a == b,
        }
    }
}

/// Decide whether moving from `live` to `desired` requires a full clear.
///
/// Both arguments are `properties` objects. A live mapping without
/// properties never needs a clear.
pub fn needs_full_clear(desired: &Map<String, Value>, live: Option<&Map<String, Value>>) -> bool {
    let Some(live) = live else {
        return false;
    };

    desired.iter().any(|(field, desired_property)| {
        let Some(live_property) = live.get(field) else {
            return false;
        };
        !MappingValue::from(desired_property).is_covered_by(&MappingValue::from(live_property))
    })
}

/// Extract `properties` for `index` from a get-mapping response.
///
/// Accepts both `{index: {mappings: {properties}}}` and a bare
/// `{mappings: {properties}}` body.
pub fn live_properties<'a>(response: &'a Value, index: &str) -> Option<&'a Map<String, Value>> {
    response
        .get(index)
        .unwrap_or(response)
        .get("mappings")?
        .get("properties")?
        .as_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn desired() -> Map<String, Value> {
        props(json!({
            "id": {"type": "keyword", "index": "true"},
            "title": {
                "type": "text",
                "boost": 1.0,
                "fields": {"keyword": {"type": "keyword", "ignore_above": 256}}
            },
            "count": {"type": "integer"}
        }))
    }

    #[test]
    fn test_identical_mapping_needs_no_clear() {
        let live = desired();
        assert!(!needs_full_clear(&desired(), Some(&live)));
    }

    #[test]
    fn test_missing_live_properties_needs_no_clear() {
        assert!(!needs_full_clear(&desired(), None));
    }

    #[test]
    fn test_new_field_needs_no_clear() {
        let live = desired();
        let mut wanted = desired();
        wanted.insert("summary".into(), json!({"type": "text"}));
        assert!(!needs_full_clear(&wanted, Some(&live)));
    }

    #[test]
    fn test_type_change_needs_clear() {
        let live = desired();
        let mut wanted = desired();
        wanted.insert("count".into(), json!({"type": "float"}));
        assert!(needs_full_clear(&wanted, Some(&live)));
    }

    #[test]
    fn test_live_only_keys_are_ignored() {
        let mut live = desired();
        live.insert("count".into(), json!({"type": "integer", "doc_values": true}));
        live.insert("_extra".into(), json!({"type": "keyword"}));
        assert!(!needs_full_clear(&desired(), Some(&live)));
    }

    #[test]
    fn test_nested_shape_mismatch_needs_clear() {
        let mut live = desired();
        live.insert("title".into(), json!({"type": "text", "boost": 1.0, "fields": "keyword"}));
        assert!(needs_full_clear(&desired(), Some(&live)));
    }

    #[test]
    fn test_fractional_boost_is_preserved() {
        let mut live = desired();
        live.insert(
            "title".into(),
            json!({
                "type": "text",
                "boost": 1,
                "fields": {"keyword": {"type": "keyword", "ignore_above": 256}}
            }),
        );
        // 1.0 in the desired mapping is not the integer 1
        assert!(needs_full_clear(&desired(), Some(&live)));
    }

    #[test]
    fn test_live_properties_shapes() {
        let response = json!({"dev_content": {"mappings": {"properties": {"a": {"type": "keyword"}}}}});
        assert!(live_properties(&response, "dev_content").is_some());

        let bare = json!({"mappings": {"properties": {}}});
        assert_eq!(live_properties(&bare, "x").map(Map::len), Some(0));

        let empty = json!({"dev_content": {"mappings": {}}});
        assert!(live_properties(&empty, "dev_content").is_none());
    }
}
