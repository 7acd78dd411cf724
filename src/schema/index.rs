//! Index definition: the fields and datasources of one search index.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::field::{FieldDescriptor, FieldType};

/// Item identifier, present on every document.
pub const SEARCH_API_ID: &str = "search_api_id";
/// Datasource the item came from.
pub const SEARCH_API_DATASOURCE: &str = "search_api_datasource";
/// Item language code.
pub const SEARCH_API_LANGUAGE: &str = "search_api_language";
/// Rank-feature boost of the item.
pub const SEARCH_API_BOOST: &str = "search_api_boost";
/// Pseudo-field used to request relevance sorting.
pub const SEARCH_API_RELEVANCE: &str = "search_api_relevance";

/// Synthetic string fields added to every index.
pub const SPECIAL_FIELDS: [&str; 3] = [SEARCH_API_ID, SEARCH_API_DATASOURCE, SEARCH_API_LANGUAGE];

/// A source of items for an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datasource {
    /// Datasource plugin id (e.g., "entity:node")
    pub id: String,
    /// Entity type behind the datasource, if any
    #[serde(default)]
    pub entity_type: Option<String>,
}

impl Datasource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), entity_type: None }
    }

    /// Datasource backed by a typed entity.
    pub fn entity(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: Some(entity_type.into()),
        }
    }
}

/// Search index definition, owned by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index id (the engine index name adds the configured prefix)
    pub id: String,
    /// Fields keyed by identifier, in declaration order
    #[serde(default)]
    pub fields: IndexMap<String, FieldDescriptor>,
    /// Datasources feeding this index
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

impl IndexDefinition {
    /// Create an empty index definition.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: IndexMap::new(),
            datasources: Vec::new(),
        }
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.id.clone(), field);
        self
    }

    /// Add a datasource.
    #[must_use]
    pub fn datasource(mut self, datasource: Datasource) -> Self {
        self.datasources.push(datasource);
        self
    }

    /// Look up a declared field.
    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.get(id)
    }

    /// Identifiers of all full-text fields, in declaration order.
    pub fn fulltext_fields(&self) -> Vec<String> {
        self.fields
            .values()
            .filter(|f| f.field_type.is_fulltext())
            .map(|f| f.id.clone())
            .collect()
    }

    /// Fields usable in filters, sorts and facets.
    ///
    /// Queries may reference the synthetic id/datasource/language fields even
    /// when the index does not declare them.
    pub fn query_fields(&self) -> IndexMap<String, FieldDescriptor> {
        let mut fields = self.fields.clone();
        for name in SPECIAL_FIELDS {
            fields
                .entry(name.to_string())
                .or_insert_with(|| FieldDescriptor::new(name, FieldType::String));
        }
        fields
    }

    /// Declared fields followed by the synthetic fields every index carries.
    pub fn mapped_fields(&self) -> Vec<FieldDescriptor> {
        let mut fields: Vec<FieldDescriptor> = self.fields.values().cloned().collect();
        for name in SPECIAL_FIELDS {
            fields.push(FieldDescriptor::new(name, FieldType::String));
        }
        fields.push(FieldDescriptor::new(SEARCH_API_BOOST, FieldType::RankFeature));
        fields
    }
}
