use std::sync::Arc;

use common::{
    storage::types::search_result::SearchResultItem, utils::search_backend::SearchBackend,
};
use tracing::{info, instrument, warn};

pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Reads the `max_results` form value; anything that is not a positive
/// integer falls back to [`DEFAULT_MAX_RESULTS`].
pub fn parse_max_results(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(DEFAULT_MAX_RESULTS)
}

/// Web search that never fails: backend errors are logged and come back as an
/// empty result list.
#[derive(Clone)]
pub struct SearchAdapter {
    backend: Arc<dyn SearchBackend>,
}

impl SearchAdapter {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip_all, fields(max_results = max_results))]
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResultItem> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.backend.search(query, max_results).await {
            Ok(mut results) => {
                results.truncate(max_results);
                info!(result_count = results.len(), "web search finished");
                results
            }
            Err(err) => {
                warn!(error = %err, "web search failed; returning no results");
                Vec::new()
            }
        }
    }
}
