//! Item API for SearchBackend.
//!
//! Bulk indexing and deletion. Per-item rejections in a bulk response are
//! collected and surfaced as one [`BackendError::BulkFailures`].

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error};

use super::SearchBackend;
use crate::compiler::CompiledRequest;
use crate::error::{BackendError, BulkItemFailure, Operation, Result};
use crate::item::IndexItem;
use crate::metrics;
use crate::schema::IndexDefinition;

impl SearchBackend {
    /// Index `items`, creating the engine index first if it is missing.
    ///
    /// Returns the ids that were submitted. If the engine rejects any item
    /// the call fails with every rejection attached.
    #[tracing::instrument(skip(self, index, items), fields(index = %index.id, count = items.len()))]
    pub async fn index_items(&self, index: &IndexDefinition, items: &[IndexItem]) -> Result<Vec<String>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        if !self.index_exists(index).await? {
            self.create_index(index).await?;
        }

        let submitted: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        let request = self.compiler.compile_index_params(index, items);
        metrics::record_bulk_size("index", items.len());

        self.run_bulk(Operation::IndexItems, &request, &submitted).await?;
        debug!(index = %request.index, count = submitted.len(), "Indexed items");
        Ok(submitted)
    }

    /// Delete items by id. Ids the engine does not know are not failures.
    #[tracing::instrument(skip(self, index, ids), fields(index = %index.id, count = ids.len()))]
    pub async fn delete_items(&self, index: &IndexDefinition, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let request = self.compiler.compile_bulk_delete_params(index, ids);
        metrics::record_bulk_size("delete", ids.len());

        self.run_bulk(Operation::DeleteItems, &request, ids).await?;
        debug!(index = %request.index, count = ids.len(), "Deleted items");
        Ok(())
    }

    async fn run_bulk(&self, operation: Operation, request: &CompiledRequest, submitted: &[String]) -> Result<()> {
        let transport = self.transport(operation, &request.index)?;

        let start = Instant::now();
        let result = transport.bulk(request.lines()).await;
        let response = self.finish(operation, &request.index, start, result)?;

        let failures = bulk_failures(&response);
        if failures.is_empty() {
            return Ok(());
        }

        for failure in &failures {
            error!(
                index = %request.index,
                id = %failure.id,
                status = failure.status,
                reason = %failure.reason,
                caused_by = failure.caused_by.as_deref().unwrap_or(""),
                "Engine rejected item"
            );
        }
        let action = if operation == Operation::DeleteItems { "delete" } else { "index" };
        metrics::record_bulk_failures(action, failures.len());

        Err(BackendError::BulkFailures {
            operation,
            index: request.index.clone(),
            failures,
            submitted: submitted.to_vec(),
        })
    }
}

/// Rejected items in a bulk response: status >= 400 with an `error` object.
fn bulk_failures(response: &Value) -> Vec<BulkItemFailure> {
    if !response.get("errors").and_then(Value::as_bool).unwrap_or(false) {
        return Vec::new();
    }

    response
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.as_object()?.values().next())
        .filter_map(|result| {
            let status = result.get("status").and_then(Value::as_u64).unwrap_or(0);
            let error = result.get("error")?;
            if status < 400 {
                return None;
            }

            let reason = error
                .get("reason")
                .or_else(|| error.get("type"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let caused_by = error
                .pointer("/caused_by/reason")
                .and_then(Value::as_str)
                .map(str::to_string);

            Some(BulkItemFailure {
                id: result.get("_id").and_then(Value::as_str).unwrap_or_default().to_string(),
                status: u16::try_from(status).unwrap_or(u16::MAX),
                reason,
                caused_by,
            })
        })
        .collect()
}
