// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search bridge.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `search_bridge_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: create_index, put_mapping, bulk_index, search, ...
//! - `status`: success, error, partial

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record an engine operation outcome
pub fn record_operation(operation: &str, status: &str) {
    counter!(
        "search_bridge_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "search_bridge_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record bulk batch size
pub fn record_bulk_size(action: &str, count: usize) {
    histogram!(
        "search_bridge_bulk_size",
        "action" => action.to_string()
    )
    .record(count as f64);
}

/// Record items rejected inside an otherwise successful bulk call
pub fn record_bulk_failures(action: &str, count: usize) {
    counter!(
        "search_bridge_bulk_item_failures_total",
        "action" => action.to_string()
    )
    .increment(count as u64);
}

// ═══════════════════════════════════════════════════════════════════════════
// ERROR TRACKING - Categorized error counters for alerting
// ═══════════════════════════════════════════════════════════════════════════

/// Record an error with category for alerting
pub fn record_error(operation: &str, error_type: &str) {
    counter!(
        "search_bridge_errors_total",
        "operation" => operation.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record a request part dropped because its input was invalid
/// (unknown sort/facet field, incomplete more-like-this options, ...)
pub fn record_validation_warning(kind: &str) {
    counter!(
        "search_bridge_validation_warnings_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

// ═══════════════════════════════════════════════════════════════════════════
// SEARCH
// ═══════════════════════════════════════════════════════════════════════════

/// Record search result count
pub fn record_search_results(count: usize) {
    histogram!("search_bridge_search_results").record(count as f64);
}

/// Record a search against an index that does not exist
pub fn record_search_missing_index() {
    counter!("search_bridge_search_missing_index_total").increment(1);
}

// ═══════════════════════════════════════════════════════════════════════════
// INDEX LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════

/// Record an index state transition
pub fn record_index_state(state: &str) {
    counter!(
        "search_bridge_index_state_transitions_total",
        "state" => state.to_string()
    )
    .increment(1);
}

/// Record a reconciliation decision (clear or update)
pub fn record_reconcile(decision: &str) {
    counter!(
        "search_bridge_reconcile_total",
        "decision" => decision.to_string()
    )
    .increment(1);
}

/// Set engine availability (1 = reachable, 0 = unreachable)
pub fn set_engine_available(available: bool) {
    gauge!("search_bridge_engine_available").set(if available { 1.0 } else { 0.0 });
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

/// Convenience macro for timing operations
#[macro_export]
macro_rules! time_operation {
    ($op:expr) => {
        $crate::metrics::LatencyTimer::new($op)
    };
}
