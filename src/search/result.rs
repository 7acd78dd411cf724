//! Canonical search results and the response parser that produces them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::FieldDescriptor;

use super::facet::parse_facets;
use super::query::QuerySpec;
use super::spellcheck::parse_spellcheck;

/// One facet value with its document count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub count: u64,
    /// Bucket key rendered as a quoted string
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    /// Absent when the engine did not score the hit (e.g. field sorts)
    pub score: Option<f64>,
    /// Stored values, always as lists
    pub fields: IndexMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub total: u64,
    pub items: Vec<ResultItem>,
    pub facets: IndexMap<String, Vec<FacetValue>>,
    pub spellcheck: IndexMap<String, Vec<String>>,
    /// Engine response as received
    #[serde(default)]
    pub raw: Value,
}

impl ResultSet {
    /// Empty result set.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Parse an engine search response.
pub fn parse_response(
    query: &QuerySpec,
    response: Value,
    fields: &IndexMap<String, FieldDescriptor>,
) -> ResultSet {
    let hits = response.get("hits");
    let total = hits
        .and_then(|h| h.get("total"))
        .and_then(|t| t.get("value").or(Some(t)))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let items = hits
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .map(|hits| hits.iter().filter_map(parse_hit).collect())
        .unwrap_or_default();

    let facets = match response.get("aggregations") {
        Some(aggregations) if !query.facets.is_empty() => parse_facets(&query.facets, aggregations, fields),
        _ => IndexMap::new(),
    };

    let spellcheck = match response.get("suggest") {
        Some(suggest) => parse_spellcheck(suggest, query.spellcheck.as_ref().and_then(|s| s.count)),
        None => IndexMap::new(),
    };

    ResultSet {
        total,
        items,
        facets,
        spellcheck,
        raw: response,
    }
}

fn parse_hit(hit: &Value) -> Option<ResultItem> {
    let id = match hit.get("_id")? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let score = hit.get("_score").and_then(Value::as_f64);

    let fields = hit
        .get("_source")
        .and_then(Value::as_object)
        .map(|source| {
            source
                .iter()
                .map(|(key, value)| {
                    let values = match value {
                        Value::Array(items) => items.clone(),
                        other => vec![other.clone()],
                    };
                    (key.clone(), values)
                })
                .collect()
        })
        .unwrap_or_default();

    Some(ResultItem { id, score, fields })
}
