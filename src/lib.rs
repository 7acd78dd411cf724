//! # Search Bridge
//!
//! Connects a backend-agnostic search model (index definitions, typed
//! items, abstract queries) to a JSON search engine speaking the
//! OpenSearch/Elasticsearch REST dialect.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SearchBackend                         │
//! │  • Index lifecycle: add, update (reconcile), remove, clear  │
//! │  • Bulk index/delete with per-item failure reporting        │
//! │  • Search, availability, supported features                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RequestCompiler                        │
//! │  • schema: field mapping, analyzers, mapping diff           │
//! │  • search: filter, sort, facets, spellcheck, MLT, fulltext  │
//! │  • indexing: bulk document bodies                           │
//! │  • hooks: one pipeline per compiled artifact                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SearchTransport                        │
//! │  • HttpTransport (reqwest)                                  │
//! │  • InMemoryTransport (tests, local development)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_bridge::{BridgeConfig, SearchBackend};
//! use search_bridge::schema::{FieldDescriptor, FieldType, IndexDefinition};
//! use search_bridge::search::{Operator, QuerySpec, SortDirection};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), search_bridge::BackendError> {
//!     let config = BridgeConfig {
//!         url: "http://localhost:9200".into(),
//!         index_prefix: "dev_".into(),
//!         ..Default::default()
//!     };
//!     let backend = SearchBackend::new(config);
//!
//!     let index = IndexDefinition::new("content")
//!         .field(FieldDescriptor::new("title", FieldType::Text).with_boost(2.0))
//!         .field(FieldDescriptor::new("width", FieldType::Decimal));
//!     backend.update_index(&index).await?;
//!
//!     let query = QuerySpec::new()
//!         .keys(["hello"])
//!         .condition("width", json!([0.9, 1.5]), Operator::Between)
//!         .sort("title", SortDirection::Asc);
//!     let results = backend.search(&index, &query).await?;
//!     println!("{} hits", results.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`backend`]: the [`SearchBackend`] sequencing engine calls
//! - [`compiler`]: pure request compilation ([`RequestCompiler`])
//! - [`schema`]: index definitions, field mapping, analyzers, mapping diff
//! - [`search`]: query model, clause builders, response parsing
//! - [`indexing`]: bulk request bodies
//! - [`transport`]: engine transports
//! - [`hooks`]: rewrite pipelines and lifecycle notifications

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod hooks;
pub mod indexing;
pub mod item;
pub mod metrics;
pub mod schema;
pub mod search;
pub mod transport;

pub use backend::{IndexState, SearchBackend};
pub use compiler::{CompiledRequest, RequestCompiler};
pub use config::BridgeConfig;
pub use error::{BackendError, BulkItemFailure, Operation};
pub use hooks::{Hooks, IndexLifecycle, Pipeline};
pub use metrics::LatencyTimer;
