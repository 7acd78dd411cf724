//! Post-processing hooks.
//!
//! Every compiler stage ends by running its output through a [`Pipeline`]:
//! an ordered list of functions that receive read-only context plus the
//! value being produced and return the (possibly rewritten) value.
//!
//! ```
//! use search_bridge::hooks::Pipeline;
//!
//! let pipeline: Pipeline<str, String> = Pipeline::new()
//!     .stage(|ctx: &str, value: String| format!("{value}-{ctx}"))
//!     .stage(|_: &str, value: String| value.to_uppercase());
//!
//! assert_eq!(pipeline.run("b", "a".to_string()), "A-B");
//! ```

use serde_json::Value;

use crate::compiler::CompiledRequest;
use crate::config::BridgeConfig;
use crate::item::IndexItem;
use crate::schema::{FieldDescriptor, IndexDefinition, PropertyDescriptor};
use crate::search::{QuerySpec, ResultSet};

type Stage<C, T> = Box<dyn Fn(&C, T) -> T + Send + Sync>;

/// Ordered chain of `(&context, value) -> value` functions.
pub struct Pipeline<C: ?Sized, T> {
    stages: Vec<Stage<C, T>>,
}

impl<C: ?Sized, T> Pipeline<C, T> {
    /// Create an empty pipeline (identity).
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage.
    #[must_use]
    pub fn stage<F>(mut self, f: F) -> Self
    where
        F: Fn(&C, T) -> T + Send + Sync + 'static,
    {
        self.stages.push(Box::new(f));
        self
    }

    /// Append a stage in place.
    pub fn push<F>(&mut self, f: F)
    where
        F: Fn(&C, T) -> T + Send + Sync + 'static,
    {
        self.stages.push(Box::new(f));
    }

    /// Thread `value` through every stage in order.
    pub fn run(&self, ctx: &C, value: T) -> T {
        self.stages.iter().fold(value, |acc, stage| stage(ctx, acc))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<C: ?Sized, T> Default for Pipeline<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, T> std::fmt::Debug for Pipeline<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("stages", &self.stages.len()).finish()
    }
}

/// All customization points of the bridge.
#[derive(Debug, Default)]
pub struct Hooks {
    /// Rewrites the mapping of a single field
    pub field_mapping: Pipeline<FieldDescriptor, PropertyDescriptor>,
    /// Rewrites a compiled search request
    pub search_params: Pipeline<QuerySpec, CompiledRequest>,
    /// Rewrites a compiled bulk index request
    pub index_params: Pipeline<[IndexItem], CompiledRequest>,
    /// Rewrites a compiled bulk delete request
    pub delete_params: Pipeline<[String], CompiledRequest>,
    /// Rewrites index settings before they are pushed
    pub settings: Pipeline<BridgeConfig, Value>,
    /// Rewrites a parsed result set
    pub results: Pipeline<QuerySpec, ResultSet>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Notifications the backend sends to the host framework.
///
/// Both methods default to no-ops.
pub trait IndexLifecycle: Send + Sync {
    /// The index was just created on the engine.
    fn index_created(&self, _index: &IndexDefinition) {}

    /// Every tracked item of the index must be indexed again.
    fn reindex_required(&self, _index: &IndexDefinition) {}
}

/// Lifecycle listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycle;

impl IndexLifecycle for NoopLifecycle {}
