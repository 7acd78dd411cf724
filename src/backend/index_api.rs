// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index lifecycle API for SearchBackend.
//!
//! Creation, reconciliation and removal of engine indices, plus the
//! close → settings → open sequence for analysis settings.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{IndexState, SearchBackend};
use crate::error::{Operation, Result};
use crate::metrics;
use crate::schema::{live_properties, needs_full_clear, IndexDefinition};

impl SearchBackend {
    /// Whether the engine index for `index` exists.
    #[tracing::instrument(skip(self, index), fields(index = %index.id))]
    pub async fn index_exists(&self, index: &IndexDefinition) -> Result<bool> {
        let name = self.index_name(index);
        let transport = self.transport(Operation::CheckExists, &name)?;

        let start = Instant::now();
        let result = transport.index_exists(&name).await;
        let exists = self.finish(Operation::CheckExists, &name, start, result)?;

        if exists && self.index_state(index) == IndexState::Uninitialized {
            self.set_state(index, IndexState::SchemaVerified);
        }
        Ok(exists)
    }

    /// Make sure the engine index exists with current settings and mappings.
    ///
    /// A missing index is created and
    /// [`IndexLifecycle::index_created`](crate::hooks::IndexLifecycle::index_created)
    /// fires once everything is in place. An existing index is left in place
    /// and only has its settings and mappings applied.
    #[tracing::instrument(skip(self, index), fields(index = %index.id))]
    pub async fn add_index(&self, index: &IndexDefinition) -> Result<()> {
        if !self.index_exists(index).await? {
            return self.create_index(index).await;
        }

        debug!(index = %index.id, "Index already exists, syncing settings and mapping");
        self.update_settings(index).await?;
        self.update_field_mapping(index).await?;
        self.set_state(index, IndexState::Ready);
        Ok(())
    }

    /// Create an index known to be absent, then apply settings and mappings.
    pub(super) async fn create_index(&self, index: &IndexDefinition) -> Result<()> {
        let name = self.index_name(index);
        let transport = self.transport(Operation::CreateIndex, &name)?;

        let start = Instant::now();
        let result = transport.create_index(&name).await;
        self.finish(Operation::CreateIndex, &name, start, result)?;
        self.set_state(index, IndexState::SchemaVerified);
        info!(index = %name, "Created index");

        self.update_settings(index).await?;
        self.update_field_mapping(index).await?;
        self.set_state(index, IndexState::Ready);

        self.lifecycle.index_created(index);
        Ok(())
    }

    /// Reconcile the engine index with an updated definition.
    ///
    /// Incompatible mapping changes drop and recreate the index; anything
    /// else is applied in place. Either way the caller is told to reindex.
    /// A missing index is simply created.
    #[tracing::instrument(skip(self, index), fields(index = %index.id))]
    pub async fn update_index(&self, index: &IndexDefinition) -> Result<()> {
        if !self.index_exists(index).await? {
            metrics::record_reconcile("create");
            return self.create_index(index).await;
        }

        if self.index_needs_clearing(index).await {
            info!(index = %index.id, "Mapping changed incompatibly, recreating index");
            metrics::record_reconcile("clear");
            self.clear_index(index).await?;
        } else {
            debug!(index = %index.id, "Applying settings and mapping in place");
            metrics::record_reconcile("in_place");
            self.update_settings(index).await?;
            self.update_field_mapping(index).await?;
            self.set_state(index, IndexState::Ready);
        }

        self.lifecycle.reindex_required(index);
        Ok(())
    }

    /// Delete the engine index. Absent indices are left alone.
    #[tracing::instrument(skip(self, index), fields(index = %index.id))]
    pub async fn remove_index(&self, index: &IndexDefinition) -> Result<()> {
        if !self.index_exists(index).await? {
            debug!(index = %index.id, "Index absent, nothing to remove");
            self.forget_state(index);
            return Ok(());
        }

        let name = self.index_name(index);
        let transport = self.transport(Operation::DeleteIndex, &name)?;

        let start = Instant::now();
        let result = transport.delete_index(&name).await;
        self.finish(Operation::DeleteIndex, &name, start, result)?;
        self.forget_state(index);
        info!(index = %name, "Removed index");
        Ok(())
    }

    /// Drop every document by recreating the index.
    pub async fn clear_index(&self, index: &IndexDefinition) -> Result<()> {
        self.remove_index(index).await?;
        self.create_index(index).await
    }

    /// Apply analysis settings. The index is closed for the update and
    /// reopened afterwards even when the update fails.
    #[tracing::instrument(skip(self, index), fields(index = %index.id))]
    pub async fn update_settings(&self, index: &IndexDefinition) -> Result<()> {
        let settings = self.compiler.compile_settings(index);
        if settings.as_object().map_or(true, |m| m.is_empty()) {
            debug!(index = %index.id, "No settings to apply");
            return Ok(());
        }

        let name = self.index_name(index);
        let transport = self.transport(Operation::UpdateSettings, &name)?;
        let start = Instant::now();

        let updated = match transport.close_index(&name).await {
            Ok(()) => transport.put_settings(&name, &settings).await,
            Err(e) => Err(e),
        };
        let reopened = transport.open_index(&name).await;

        let result = updated.and(reopened);
        self.finish(Operation::UpdateSettings, &name, start, result)
    }

    /// Put the desired field mappings.
    #[tracing::instrument(skip(self, index), fields(index = %index.id))]
    pub async fn update_field_mapping(&self, index: &IndexDefinition) -> Result<()> {
        let request = self.compiler.compile_mapping_params(index);
        let transport = self.transport(Operation::UpdateMapping, &request.index)?;

        let start = Instant::now();
        let result = transport.put_mapping(&request.index, &request.body).await;
        self.finish(Operation::UpdateMapping, &request.index, start, result)
    }

    /// Whether applying the desired mapping requires dropping the index.
    ///
    /// Unreadable live mappings count as incompatible. An index without
    /// properties never needs clearing.
    pub async fn index_needs_clearing(&self, index: &IndexDefinition) -> bool {
        let name = self.index_name(index);
        let response: Value = match self.transport(Operation::UpdateMapping, &name) {
            Ok(transport) => match transport.get_mapping(&name).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(index = %name, error = %e, "Could not read live mapping");
                    metrics::record_error(Operation::UpdateMapping.as_str(), e.kind());
                    return true;
                }
            },
            Err(_) => return true,
        };

        let desired = self.compiler.properties(index);
        needs_full_clear(&desired, live_properties(&response, &name))
    }
}
