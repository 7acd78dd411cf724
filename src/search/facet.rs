//! Facets: term aggregations out, buckets back in.
//!
//! ```text
//! and facet  → {"<id>": {"terms": {"field": f, "size"?: n}}}
//! or facet   → {"<id>_global": {"global": {}, "aggs": {"<id>": {"terms": {...}}}}}
//! ```
//!
//! `or` facets live in a global aggregation so their counts ignore the
//! query's own filters.

use chrono::DateTime;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::metrics;
use crate::schema::{FieldDescriptor, FieldType};

use super::query::{FacetOperator, FacetRequest};
use super::result::FacetValue;

/// Bucket count used when a facet sets no limit.
pub const DEFAULT_FACET_SIZE: usize = 10;

/// Bucket count used for "no limit" (the engine's default ceiling).
pub const UNLIMITED_FACET_SIZE: usize = 10_000;

/// Key of the global container wrapping an `or` facet.
pub fn global_key(facet_id: &str) -> String {
    format!("{facet_id}_global")
}

/// Compile facet requests into the `aggs` object.
pub fn compile_facets(
    facets: &IndexMap<String, FacetRequest>,
    fields: &IndexMap<String, FieldDescriptor>,
) -> Map<String, Value> {
    let mut aggs = Map::new();

    for (facet_id, facet) in facets {
        if !fields.contains_key(&facet.field) {
            warn!(facet = %facet_id, field = %facet.field, "Unknown facet field");
            metrics::record_validation_warning("unknown_facet_field");
            continue;
        }

        let terms = term_aggregation(facet);
        match facet.operator {
            FacetOperator::And => {
                aggs.insert(facet_id.clone(), terms);
            }
            FacetOperator::Or => {
                aggs.insert(
                    global_key(facet_id),
                    json!({"global": {}, "aggs": {facet_id.as_str(): terms}}),
                );
            }
        }
    }

    aggs
}

fn term_aggregation(facet: &FacetRequest) -> Value {
    let size = match facet.limit {
        None => DEFAULT_FACET_SIZE,
        Some(0) => UNLIMITED_FACET_SIZE,
        Some(n) => n,
    };

    let mut terms = Map::new();
    terms.insert("field".into(), json!(facet.field));
    if size != DEFAULT_FACET_SIZE {
        terms.insert("size".into(), json!(size));
    }
    json!({"terms": terms})
}

/// Read facet buckets back out of an `aggregations` response object.
///
/// Facets whose buckets are missing are logged and left out.
pub fn parse_facets(
    facets: &IndexMap<String, FacetRequest>,
    aggregations: &Value,
    fields: &IndexMap<String, FieldDescriptor>,
) -> IndexMap<String, Vec<FacetValue>> {
    let mut parsed = IndexMap::new();

    for (facet_id, facet) in facets {
        let container = match facet.operator {
            FacetOperator::And => aggregations.get(facet_id),
            FacetOperator::Or => aggregations
                .get(global_key(facet_id))
                .and_then(|global| global.get(facet_id)),
        };
        let Some(buckets) = container
            .and_then(|c| c.get("buckets"))
            .and_then(Value::as_array)
        else {
            warn!(facet = %facet_id, operator = ?facet.operator, "Missing facet buckets in response");
            continue;
        };

        let is_date = fields
            .get(&facet.field)
            .is_some_and(|f| f.field_type == FieldType::Date);

        let values = buckets
            .iter()
            .filter_map(|bucket| parse_bucket(bucket, is_date))
            .collect();
        parsed.insert(facet_id.clone(), values);
    }

    parsed
}

fn parse_bucket(bucket: &Value, is_date: bool) -> Option<FacetValue> {
    let count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);

    let key = if is_date {
        match bucket
            .get("key_as_string")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            Some(date) => date.timestamp().to_string(),
            None => render_key(bucket.get("key")?),
        }
    } else {
        render_key(bucket.get("key")?)
    };

    Some(FacetValue {
        count,
        filter: format!("\"{key}\""),
    })
}

fn render_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
