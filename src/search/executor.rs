//! Query execution against the index store

use crate::metrics::{SEARCH_DURATION_SECONDS, SEARCH_FAILURES_TOTAL};
use crate::search::document::ProductDocument;
use crate::search::error::SearchResult;
use crate::search::index::IndexStore;
use crate::search::query::{Pagination, SearchQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResultPage {
    /// Matching products, most relevant first
    pub content: Vec<ProductDocument>,

    /// Total matches across all pages
    pub total_hits: u64,

    /// Zero-based page number
    pub page: usize,

    /// Requested page size
    pub size: usize,

    /// Number of pages needed to show every match
    pub total_pages: u64,
}

impl SearchResultPage {
    pub fn new(content: Vec<ProductDocument>, total_hits: u64, page: Pagination) -> Self {
        let total_pages = if page.size == 0 {
            0
        } else {
            total_hits.div_ceil(page.size as u64)
        };

        Self {
            content,
            total_hits,
            page: page.page,
            size: page.size,
            total_pages,
        }
    }

    /// A page with no results
    pub fn empty(page: Pagination) -> Self {
        Self::new(Vec::new(), 0, page)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Runs search queries and shapes hits into result pages
pub struct SearchExecutor {
    index: Arc<dyn IndexStore>,
}

impl SearchExecutor {
    pub fn new(index: Arc<dyn IndexStore>) -> Self {
        Self { index }
    }

    /// Execute a query, returning hits in the store's relevance order
    pub async fn execute(&self, query: &SearchQuery) -> SearchResult<SearchResultPage> {
        debug!(dsl = %query.to_dsl(), "Executing search");

        let timer = SEARCH_DURATION_SECONDS.start_timer();
        let result = self.index.search(query).await;
        timer.observe_duration();

        let hits = result.inspect_err(|e| {
            SEARCH_FAILURES_TOTAL.inc();
            warn!(error = %e, "Search against index failed");
        })?;

        Ok(SearchResultPage::new(hits.documents, hits.total_hits, query.page))
    }
}
