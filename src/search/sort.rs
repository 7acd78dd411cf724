//! Sort compiler.

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::warn;

use crate::metrics;
use crate::schema::{FieldDescriptor, SEARCH_API_ID, SEARCH_API_RELEVANCE};

use super::query::QuerySpec;

/// Compile the query's sorts into an ordered list of `{target: direction}`.
///
/// Relevance sorting only applies when the query has search keys; full-text
/// fields sort on their `keyword` sub-field; unknown fields are logged and
/// dropped.
pub fn compile_sorts(query: &QuerySpec, fields: &IndexMap<String, FieldDescriptor>) -> Vec<Value> {
    let mut sorts = Vec::with_capacity(query.sorts.len());

    for (field_id, direction) in &query.sorts {
        let target = match field_id.as_str() {
            SEARCH_API_RELEVANCE => {
                if !query.has_keys() {
                    continue;
                }
                "_score".to_string()
            }
            SEARCH_API_ID => "id".to_string(),
            "_id" => "_id".to_string(),
            other => match fields.get(other) {
                Some(field) if field.field_type.is_fulltext() => format!("{other}.keyword"),
                Some(_) => other.to_string(),
                None => {
                    warn!(field = %other, "Invalid sorting field");
                    metrics::record_validation_warning("unknown_sort_field");
                    continue;
                }
            },
        };
        sorts.push(json!({ target: direction.as_str() }));
    }

    sorts
}
