// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index schema: abstract field model, engine mapping and reconciliation.
//!
//! # Example
//!
//! ```
//! use search_bridge::hooks::Pipeline;
//! use search_bridge::schema::{FieldDescriptor, FieldMapper, FieldType, IndexDefinition};
//!
//! let index = IndexDefinition::new("content")
//!     .field(FieldDescriptor::new("title", FieldType::Text).with_boost(2.0))
//!     .field(FieldDescriptor::new("created", FieldType::Date));
//!
//! let properties = FieldMapper::properties(&index, &Pipeline::new());
//! assert_eq!(properties["created"]["type"], "date");
//! assert_eq!(properties["title"]["fields"]["keyword"]["ignore_above"], 256);
//! ```

pub mod analyser;
pub mod field;
pub mod field_mapper;
pub mod index;
pub mod reconcile;

pub use analyser::{index_settings, synonyms_stage, Analyser};
pub use field::{FieldDescriptor, FieldType};
pub use field_mapper::{FieldMapper, PropertyDescriptor};
pub use index::{
    Datasource, IndexDefinition, SEARCH_API_BOOST, SEARCH_API_DATASOURCE, SEARCH_API_ID,
    SEARCH_API_LANGUAGE, SEARCH_API_RELEVANCE, SPECIAL_FIELDS,
};
pub use reconcile::{live_properties, needs_full_clear, MappingValue};
