//! Field Mapper
//!
//! Maps abstract field types to engine property descriptors and assembles
//! the mapping PUT body for an index.
//!
//! ```text
//! text           → {"type":"text","boost":b,"fields":{"keyword":{"type":"keyword","ignore_above":256}}}
//! string/uri/... → {"type":"keyword"}
//! date           → {"type":"date","format":"strict_date_optional_time||epoch_second"}
//! ngram          → {"type":"text","index":true,"boost":b,"analyzer":"ngram_analyzer","fields":{"keyword":{...}}}
//! <unknown>      → {}
//! ```
//!
//! Every full-text property carries the `keyword` sub-field, so sorts on
//! full-text fields target `<field>.keyword`.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::hooks::Pipeline;

use super::analyser::Analyser;
use super::field::{FieldDescriptor, FieldType};
use super::index::IndexDefinition;

/// Engine schema property for one field.
pub type PropertyDescriptor = Map<String, Value>;

/// Accepted input formats for date and date-range fields.
pub const DATE_FORMAT: &str = "strict_date_optional_time||epoch_second";

/// Longest value indexed by the `keyword` sub-field of full-text fields.
pub const KEYWORD_IGNORE_ABOVE: u64 = 256;

fn keyword_subfield() -> Value {
    json!({"keyword": {"type": "keyword", "ignore_above": KEYWORD_IGNORE_ABOVE}})
}

/// Field type mapper
pub struct FieldMapper;

impl FieldMapper {
    /// Map one field, without hooks.
    pub fn property(field: &FieldDescriptor) -> PropertyDescriptor {
        let value = match &field.field_type {
            FieldType::Text => json!({
                "type": "text",
                "boost": field.boost,
                "fields": keyword_subfield()
            }),
            FieldType::String | FieldType::Uri | FieldType::Token => json!({"type": "keyword"}),
            FieldType::Integer | FieldType::Duration => json!({"type": "integer"}),
            FieldType::Boolean => json!({"type": "boolean"}),
            FieldType::Decimal => json!({"type": "float"}),
            FieldType::Date => json!({"type": "date", "format": DATE_FORMAT}),
            FieldType::Attachment => json!({"type": "attachment"}),
            FieldType::Object => json!({"type": "nested"}),
            FieldType::Location => json!({"type": "geo_point"}),
            FieldType::RankFeature => json!({"type": "rank_feature"}),
            FieldType::Ngram => json!({
                "type": "text",
                "index": true,
                "boost": field.boost,
                "analyzer": Analyser::Ngram.id(),
                "fields": keyword_subfield()
            }),
            FieldType::EdgeNgram => json!({
                "type": "text",
                "index": true,
                "boost": field.boost,
                "analyzer": Analyser::EdgeNgram.id(),
                "fields": keyword_subfield()
            }),
            FieldType::DateRange => json!({"type": "date_range", "format": DATE_FORMAT}),
            FieldType::SearchAsYouType => json!({
                "type": "search_as_you_type",
                "fields": keyword_subfield()
            }),
            FieldType::Unsupported(name) => {
                debug!(field = %field.id, field_type = %name, "No mapping for field type");
                Value::Object(Map::new())
            }
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Map one field and pass the result through the field-mapping hook.
    ///
    /// The hook runs exactly once per call, even when it changes nothing.
    pub fn map_field(
        field: &FieldDescriptor,
        hook: &Pipeline<FieldDescriptor, PropertyDescriptor>,
    ) -> PropertyDescriptor {
        hook.run(field, Self::property(field))
    }

    /// Desired `properties` object for an index.
    ///
    /// Starts with the document `id` keyword, then the declared fields, then
    /// the synthetic id/datasource/language/boost fields.
    pub fn properties(
        index: &IndexDefinition,
        hook: &Pipeline<FieldDescriptor, PropertyDescriptor>,
    ) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("id".into(), json!({"type": "keyword", "index": "true"}));

        for field in index.mapped_fields() {
            let property = Self::map_field(&field, hook);
            properties.insert(field.id.clone(), Value::Object(property));
        }

        properties
    }

    /// Mapping PUT body: `{"properties": {...}}`.
    pub fn mapping_body(
        index: &IndexDefinition,
        hook: &Pipeline<FieldDescriptor, PropertyDescriptor>,
    ) -> Value {
        json!({"properties": Self::properties(index, hook)})
    }
}
