//! Search API for SearchBackend.

use std::time::Instant;

use tracing::{debug, warn};

use super::{SearchBackend, SUPPORTED_FEATURES};
use crate::error::{Operation, Result};
use crate::metrics;
use crate::schema::IndexDefinition;
use crate::search::{QuerySpec, ResultSet};

impl SearchBackend {
    /// Run `query` against `index`.
    ///
    /// A missing engine index yields an empty result rather than an error.
    #[tracing::instrument(skip(self, index, query), fields(index = %index.id))]
    pub async fn search(&self, index: &IndexDefinition, query: &QuerySpec) -> Result<ResultSet> {
        if !self.index_exists(index).await? {
            warn!(index = %index.id, "Searching an index that does not exist");
            metrics::record_search_missing_index();
            return Ok(ResultSet::empty());
        }

        let request = self.compiler.compile_search_params(index, query);
        let transport = self.transport(Operation::Search, &request.index)?;

        let start = Instant::now();
        let result = transport.search(&request.index, &request.body).await;
        let response = self.finish(Operation::Search, &request.index, start, result)?;

        let results = self.compiler.parse_search_response(index, query, response);
        metrics::record_search_results(results.items.len());
        debug!(index = %request.index, total = results.total, returned = results.items.len(), "Search complete");
        Ok(results)
    }

    /// Whether the engine answers a ping.
    pub async fn is_available(&self) -> bool {
        let _timer = crate::time_operation!("ping");
        let available = match self.transport(Operation::CheckExists, "") {
            Ok(transport) => match transport.ping().await {
                Ok(up) => up,
                Err(e) => {
                    warn!(url = %self.config().url, error = %e, "Search engine unreachable");
                    false
                }
            },
            Err(_) => false,
        };
        metrics::set_engine_available(available);
        available
    }

    /// Optional features this backend implements.
    pub fn supported_features(&self) -> &'static [&'static str] {
        &SUPPORTED_FEATURES
    }
}
