// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search backend.
//!
//! The [`SearchBackend`] sequences schema reconciliation, compiled bulk and
//! search calls against the engine, and response parsing:
//! - request bodies come from the [`RequestCompiler`]
//! - engine calls go through a [`SearchTransport`], created on first use
//! - every transport failure is wrapped into a [`BackendError`]
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized → SchemaVerified → Ready
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use search_bridge::{BridgeConfig, SearchBackend};
//! use search_bridge::item::IndexItem;
//! use search_bridge::schema::{FieldDescriptor, FieldType, IndexDefinition};
//! use search_bridge::search::QuerySpec;
//! use search_bridge::transport::InMemoryTransport;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), search_bridge::BackendError> {
//! let engine = Arc::new(InMemoryTransport::new());
//! let backend = SearchBackend::with_transport(BridgeConfig::default(), engine.clone());
//!
//! let index = IndexDefinition::new("content")
//!     .field(FieldDescriptor::new("title", FieldType::Text));
//!
//! let item = IndexItem::new("entity:node/1:en", "entity:node", "en")
//!     .field("title", FieldType::Text, vec![json!("Hello")]);
//!
//! // Creates the index on first use
//! backend.index_items(&index, &[item]).await?;
//!
//! let result = backend.search(&index, &QuerySpec::new()).await?;
//! assert_eq!(result.total, 1);
//! # Ok(())
//! # }
//! ```

mod index_api;
mod item_api;
mod search_api;
mod types;

pub use types::{IndexState, SUPPORTED_FEATURES};

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::compiler::RequestCompiler;
use crate::config::BridgeConfig;
use crate::error::{BackendError, Operation, Result};
use crate::hooks::{Hooks, IndexLifecycle, NoopLifecycle};
use crate::metrics;
use crate::schema::IndexDefinition;
use crate::search::ItemIdResolver;
use crate::transport::{
    HttpTransportFactory, SearchTransport, SharedTransport, TransportError, TransportFactory,
};

pub struct SearchBackend {
    compiler: RequestCompiler,
    factory: Box<dyn TransportFactory>,
    /// Created on first use, then reused
    transport: Mutex<Option<Arc<dyn SearchTransport>>>,
    lifecycle: Arc<dyn IndexLifecycle>,
    states: DashMap<String, IndexState>,
}

impl SearchBackend {
    /// Backend talking HTTP to `config.url`.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_factory(config, Box::new(HttpTransportFactory))
    }

    /// Backend using an already-built transport.
    pub fn with_transport(config: BridgeConfig, transport: Arc<dyn SearchTransport>) -> Self {
        Self::with_factory(config, Box::new(SharedTransport(transport)))
    }

    pub fn with_factory(config: BridgeConfig, factory: Box<dyn TransportFactory>) -> Self {
        Self {
            compiler: RequestCompiler::new(config),
            factory,
            transport: Mutex::new(None),
            lifecycle: Arc::new(NoopLifecycle),
            states: DashMap::new(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        let config = self.compiler.config().clone();
        self.compiler = RequestCompiler::with_hooks(config, hooks);
        self
    }

    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn IndexLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ItemIdResolver>) -> Self {
        self.compiler = self.compiler.with_resolver(resolver);
        self
    }

    pub fn compiler(&self) -> &RequestCompiler {
        &self.compiler
    }

    pub fn config(&self) -> &BridgeConfig {
        self.compiler.config()
    }

    /// Engine index name for an index definition.
    pub fn index_name(&self, index: &IndexDefinition) -> String {
        self.compiler.index_name(index)
    }

    /// Current state of an index.
    #[must_use]
    pub fn index_state(&self, index: &IndexDefinition) -> IndexState {
        self.states.get(&index.id).map(|s| *s).unwrap_or_default()
    }

    fn set_state(&self, index: &IndexDefinition, state: IndexState) {
        let previous = self.states.insert(index.id.clone(), state).unwrap_or_default();
        if previous != state {
            debug!(index = %index.id, from = %previous, to = %state, "Index state transition");
            metrics::record_index_state(&state.to_string());
        }
    }

    fn forget_state(&self, index: &IndexDefinition) {
        if self.states.remove(&index.id).is_some() {
            metrics::record_index_state(&IndexState::Uninitialized.to_string());
        }
    }

    /// The cached transport, connecting on first use.
    fn transport(&self, operation: Operation, index: &str) -> Result<Arc<dyn SearchTransport>> {
        let mut slot = self.transport.lock();
        if let Some(transport) = slot.as_ref() {
            return Ok(Arc::clone(transport));
        }

        debug!(url = %self.config().url, "Connecting to search engine");
        let transport = self
            .factory
            .connect(self.config())
            .map_err(|e| self.fail(operation, index, e))?;
        *slot = Some(Arc::clone(&transport));
        Ok(transport)
    }

    /// Record the outcome of an engine call and wrap its error.
    fn finish<T>(
        &self,
        operation: Operation,
        index: &str,
        start: Instant,
        result: std::result::Result<T, TransportError>,
    ) -> Result<T> {
        metrics::record_latency(operation.as_str(), start.elapsed());
        match result {
            Ok(value) => {
                metrics::record_operation(operation.as_str(), "success");
                Ok(value)
            }
            Err(e) => Err(self.fail(operation, index, e)),
        }
    }

    fn fail(&self, operation: Operation, index: &str, source: TransportError) -> BackendError {
        error!(index, operation = operation.as_str(), error = %source, "Engine call failed");
        metrics::record_operation(operation.as_str(), "error");
        metrics::record_error(operation.as_str(), source.kind());
        BackendError::transport(operation, index, source)
    }
}

impl std::fmt::Debug for SearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBackend")
            .field("compiler", &self.compiler)
            .field("connected", &self.transport.lock().is_some())
            .finish_non_exhaustive()
    }
}
