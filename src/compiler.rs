// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Request compiler - the pure entry points of the bridge
//!
//! Every method is a function of its inputs plus the matching hook stage,
//! which runs exactly once per call.
//!
//! # Example
//!
//! ```
//! use search_bridge::{BridgeConfig, RequestCompiler};
//! use search_bridge::schema::{FieldDescriptor, FieldType, IndexDefinition};
//! use search_bridge::search::{Operator, QuerySpec};
//! use serde_json::json;
//!
//! let compiler = RequestCompiler::new(BridgeConfig::default());
//! let index = IndexDefinition::new("content")
//!     .field(FieldDescriptor::new("width", FieldType::Decimal));
//!
//! let query = QuerySpec::new().condition("width", json!([0.9, 1.5]), Operator::Between);
//! let request = compiler.compile_search_params(&index, &query);
//!
//! assert_eq!(request.index, "content");
//! assert_eq!(
//!     request.body["query"]["bool"]["filter"][0]["bool"]["must"][0],
//!     json!({"range": {"width": {"from": 0.9, "to": 1.5, "include_lower": false, "include_upper": false}}})
//! );
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::BridgeConfig;
use crate::hooks::Hooks;
use crate::indexing::{bulk_delete_body, bulk_index_body};
use crate::item::IndexItem;
use crate::schema::{index_settings, synonyms_stage, FieldMapper, IndexDefinition};
use crate::search::{build_search_body, parse_response, CombinedIdResolver, ItemIdResolver, QuerySpec, ResultSet};

/// Target index plus JSON body. Recomputed for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledRequest {
    pub index: String,
    pub body: Value,
}

impl CompiledRequest {
    pub fn new(index: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            body,
        }
    }

    /// Bulk action lines, empty when the body is not a list.
    pub fn lines(&self) -> &[Value] {
        self.body.as_array().map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct RequestCompiler {
    config: BridgeConfig,
    hooks: Hooks,
    resolver: Arc<dyn ItemIdResolver>,
}

impl RequestCompiler {
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_hooks(config, Hooks::default())
    }

    pub fn with_hooks(config: BridgeConfig, hooks: Hooks) -> Self {
        Self {
            config,
            hooks,
            resolver: Arc::new(CombinedIdResolver),
        }
    }

    /// Replace the more-like-this seed resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ItemIdResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Engine index name for an index definition.
    pub fn index_name(&self, index: &IndexDefinition) -> String {
        self.config.index_name(&index.id)
    }

    /// Bulk body indexing `items`.
    pub fn compile_index_params(&self, index: &IndexDefinition, items: &[IndexItem]) -> CompiledRequest {
        let name = self.index_name(index);
        let request = CompiledRequest::new(&name, Value::Array(bulk_index_body(&name, items)));
        self.hooks.index_params.run(items, request)
    }

    /// Search body for `query`.
    pub fn compile_search_params(&self, index: &IndexDefinition, query: &QuerySpec) -> CompiledRequest {
        let body = build_search_body(query, index, &self.config, self.resolver.as_ref());
        let request = CompiledRequest::new(self.index_name(index), body);
        self.hooks.search_params.run(query, request)
    }

    /// Bulk body deleting `ids`.
    pub fn compile_bulk_delete_params(&self, index: &IndexDefinition, ids: &[String]) -> CompiledRequest {
        let name = self.index_name(index);
        let request = CompiledRequest::new(&name, Value::Array(bulk_delete_body(&name, ids)));
        self.hooks.delete_params.run(ids, request)
    }

    /// Canonical result set for an engine search response.
    pub fn parse_search_response(&self, index: &IndexDefinition, query: &QuerySpec, response: Value) -> ResultSet {
        let result = parse_response(query, response, &index.query_fields());
        self.hooks.results.run(query, result)
    }

    /// Desired `properties`, field-mapping hook applied.
    pub fn properties(&self, index: &IndexDefinition) -> Map<String, Value> {
        FieldMapper::properties(index, &self.hooks.field_mapping)
    }

    /// Mapping PUT request: `{"index": name, "body": {"properties": {...}}}`.
    pub fn compile_mapping_params(&self, index: &IndexDefinition) -> CompiledRequest {
        CompiledRequest::new(
            self.index_name(index),
            FieldMapper::mapping_body(index, &self.hooks.field_mapping),
        )
    }

    /// Settings for the analyzers the mapping references, configured
    /// synonyms and then the settings hook applied.
    pub fn compile_settings(&self, index: &IndexDefinition) -> Value {
        let settings = synonyms_stage(&self.config, index_settings(&self.properties(index), &self.config));
        self.hooks.settings.run(&self.config, settings)
    }
}

impl std::fmt::Debug for RequestCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCompiler")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
