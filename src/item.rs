//! Items handed over by the host for indexing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::FieldType;

/// Extracted values of one field of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl ItemField {
    pub fn new(field_type: FieldType, values: Vec<Value>) -> Self {
        Self { field_type, values }
    }
}

/// An item ready to be written to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexItem {
    /// Combined item id, unique per index
    pub id: String,
    pub datasource: String,
    pub language: String,
    #[serde(default = "default_boost")]
    pub boost: f64,
    #[serde(default)]
    pub fields: IndexMap<String, ItemField>,
}

fn default_boost() -> f64 { 1.0 }

impl IndexItem {
    pub fn new(
        id: impl Into<String>,
        datasource: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            datasource: datasource.into(),
            language: language.into(),
            boost: default_boost(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    /// Add a field with its values.
    #[must_use]
    pub fn field(mut self, id: impl Into<String>, field_type: FieldType, values: Vec<Value>) -> Self {
        self.fields.insert(id.into(), ItemField::new(field_type, values));
        self
    }
}
