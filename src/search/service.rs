//! Smart search entry point

use crate::metrics::SEARCH_REQUESTS_TOTAL;
use crate::search::error::SearchResult;
use crate::search::executor::{SearchExecutor, SearchResultPage};
use crate::search::index::{IndexStats, IndexStore};
use crate::search::price_intent::PriceIntentParser;
use crate::search::query::{Pagination, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

/// Turns raw user text into a page of products.
///
/// Text carrying a recognizable price phrase becomes a price-filtered search
/// on the leftover keyword; everything else is a plain multi-field search.
pub struct SmartSearchService {
    parser: PriceIntentParser,
    executor: SearchExecutor,
    index: Arc<dyn IndexStore>,
}

impl SmartSearchService {
    pub fn new(index: Arc<dyn IndexStore>) -> Self {
        Self {
            parser: PriceIntentParser::new(),
            executor: SearchExecutor::new(index.clone()),
            index,
        }
    }

    /// Search with free text.
    ///
    /// Blank text returns an empty page without querying the index.
    pub async fn search(&self, raw: &str, page: Pagination) -> SearchResult<SearchResultPage> {
        if raw.trim().is_empty() {
            return Ok(SearchResultPage::empty(page));
        }

        let intent = self.parser.parse(raw);
        let variant = if intent.has_ceiling() {
            "price_filtered"
        } else {
            "multi_field"
        };
        SEARCH_REQUESTS_TOTAL.with_label_values(&[variant]).inc();

        debug!(
            variant,
            keyword = ?intent.keyword(),
            ceiling = ?intent.ceiling,
            "Parsed search intent"
        );

        let query = QueryBuilder::build(intent.keyword(), intent.ceiling, page);
        self.executor.execute(&query).await
    }

    /// Statistics of the underlying index
    pub async fn index_stats(&self) -> SearchResult<IndexStats> {
        self.index.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::document::ProductDocument;
    use crate::search::error::SearchError;
    use crate::search::index::IndexHits;
    use crate::search::query::SearchQuery;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// Records every query and returns nothing
    #[derive(Default)]
    struct RecordingIndex {
        queries: Mutex<Vec<SearchQuery>>,
    }

    #[async_trait]
    impl IndexStore for RecordingIndex {
        async fn search(&self, query: &SearchQuery) -> SearchResult<IndexHits> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(IndexHits::default())
        }

        async fn delete_all(&self) -> SearchResult<()> {
            Ok(())
        }

        async fn bulk_insert(&self, documents: &[ProductDocument]) -> SearchResult<usize> {
            Ok(documents.len())
        }

        async fn stats(&self) -> SearchResult<IndexStats> {
            Err(SearchError::IndexUnavailable("not tracked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_blank_query_skips_index() {
        let index = Arc::new(RecordingIndex::default());
        let service = SmartSearchService::new(index.clone());

        for raw in ["", "   ", "\t\n"] {
            let page = service.search(raw, Pagination::new(0, 10)).await.unwrap();
            assert!(page.is_empty());
            assert_eq!(page.total_hits, 0);
        }

        assert!(index.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_price_phrase_becomes_filter() {
        let index = Arc::new(RecordingIndex::default());
        let service = SmartSearchService::new(index.clone());

        service
            .search("running shoes under 2000", Pagination::new(1, 20))
            .await
            .unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].keyword.as_deref(), Some("running shoes"));
        assert_eq!(queries[0].ceiling, Some(Decimal::new(2000, 0)));
        assert_eq!(queries[0].page, Pagination::new(1, 20));
    }

    #[tokio::test]
    async fn test_plain_text_is_multi_field() {
        let index = Arc::new(RecordingIndex::default());
        let service = SmartSearchService::new(index.clone());

        service
            .search("  laptop  ", Pagination::default())
            .await
            .unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].keyword.as_deref(), Some("laptop"));
        assert!(!queries[0].has_price_filter());
    }

    #[tokio::test]
    async fn test_price_only_has_no_keyword() {
        let index = Arc::new(RecordingIndex::default());
        let service = SmartSearchService::new(index.clone());

        service
            .search("under 500", Pagination::default())
            .await
            .unwrap();

        let queries = index.queries.lock().unwrap();
        assert!(queries[0].keyword.is_none());
        assert_eq!(queries[0].ceiling, Some(Decimal::new(500, 0)));
    }

    #[tokio::test]
    async fn test_index_errors_propagate() {
        let index = Arc::new(RecordingIndex::default());
        let service = SmartSearchService::new(index);

        let err = service.index_stats().await.unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(_)));
    }
}
