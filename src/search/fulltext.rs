//! Full-text clause for the search keys.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::schema::{FieldDescriptor, IndexDefinition};

use super::query::QuerySpec;

/// Full-text fields a query searches: its own list, or every full-text
/// field of the index.
pub fn searched_fields(query: &QuerySpec, index: &IndexDefinition) -> Vec<String> {
    match &query.fulltext_fields {
        Some(fields) => fields.clone(),
        None => index.fulltext_fields(),
    }
}

/// `multi_match` over the searched fields, `None` without keys.
///
/// Each field carries its boost as `field^boost` unless the boost is 1.
pub fn compile_fulltext(
    query: &QuerySpec,
    searched: &[String],
    fields: &IndexMap<String, FieldDescriptor>,
    fuzziness: Option<&str>,
) -> Option<Value> {
    if !query.has_keys() {
        return None;
    }

    let targets: Vec<String> = searched
        .iter()
        .filter_map(|id| match fields.get(id) {
            Some(field) if field.boost != 1.0 => Some(format!("{id}^{}", field.boost)),
            Some(_) => Some(id.clone()),
            None => {
                warn!(field = %id, "Unknown full-text field");
                None
            }
        })
        .collect();

    let mut clause = Map::new();
    clause.insert("query".into(), json!(query.keys.join(" ")));
    if !targets.is_empty() {
        clause.insert("fields".into(), json!(targets));
    }
    clause.insert("operator".into(), json!(query.keys_conjunction.as_str()));
    if let Some(fuzziness) = fuzziness {
        clause.insert("fuzziness".into(), json!(fuzziness));
    }

    Some(json!({"multi_match": clause}))
}
