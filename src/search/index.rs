//! Search index storage

use crate::search::config::SearchConfig;
use crate::search::document::{build_product_schema, ProductDocument, ProductFields};
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{QueryBuilder, SearchQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

/// One page of raw index hits, in relevance order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexHits {
    /// Documents on the requested page
    pub documents: Vec<ProductDocument>,

    /// Total number of matching documents across all pages
    pub total_hits: u64,
}

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Number of segments
    pub num_segments: usize,

    /// Time of the last successful bulk insert
    pub last_commit: Option<DateTime<Utc>>,
}

/// Document store backing product search
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Execute a query and return the requested page of hits
    async fn search(&self, query: &SearchQuery) -> SearchResult<IndexHits>;

    /// Remove every document. The removal is visible to searches once this returns.
    async fn delete_all(&self) -> SearchResult<()>;

    /// Insert documents, replacing any with the same id
    async fn bulk_insert(&self, documents: &[ProductDocument]) -> SearchResult<usize>;

    /// Document count and segment layout
    async fn stats(&self) -> SearchResult<IndexStats>;
}

/// Tantivy-backed index store
pub struct TantivyIndexStore {
    /// Resolved schema fields
    fields: ProductFields,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader, reloaded after every commit
    reader: IndexReader,

    /// Query compiler
    query_builder: QueryBuilder,

    last_commit: RwLock<Option<DateTime<Utc>>>,
}

impl TantivyIndexStore {
    /// Open the index at `config.index_path`, creating it if needed
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        std::fs::create_dir_all(&config.index_path).map_err(|e| {
            SearchError::IndexInitFailed(format!("Failed to create index directory: {}", e))
        })?;

        let index = if Self::index_exists(&config.index_path) {
            Index::open_in_dir(&config.index_path).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to open existing index: {}", e))
            })?
        } else {
            Index::create_in_dir(&config.index_path, build_product_schema()).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to create new index: {}", e))
            })?
        };

        Self::from_index(index, config.writer_heap_size)
    }

    /// Create a store over a volatile in-memory index
    pub fn in_memory(writer_heap_size: usize) -> SearchResult<Self> {
        Self::from_index(Index::create_in_ram(build_product_schema()), writer_heap_size)
    }

    fn from_index(index: Index, writer_heap_size: usize) -> SearchResult<Self> {
        let fields = ProductFields::from_schema(&index.schema())?;

        let writer: IndexWriter = index
            .writer(writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        Ok(Self {
            query_builder: QueryBuilder::new(index, fields),
            fields,
            writer: Arc::new(RwLock::new(writer)),
            reader,
            last_commit: RwLock::new(None),
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }
}

#[async_trait]
impl IndexStore for TantivyIndexStore {
    async fn search(&self, query: &SearchQuery) -> SearchResult<IndexHits> {
        let tantivy_query = self.query_builder.compile(query)?;
        let searcher = self.reader.searcher();

        // The collector preallocates offset + limit slots, so both are bounded
        // by the live document count before it is built.
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        let offset = query.page.offset();

        if query.page.size == 0 || offset >= num_docs {
            let total_hits = searcher.search(&*tantivy_query, &Count)? as u64;
            return Ok(IndexHits {
                documents: Vec::new(),
                total_hits,
            });
        }

        let limit = query.page.size.min(num_docs - offset);
        let top_docs_collector = TopDocs::with_limit(limit).and_offset(offset);
        let (top_docs, total) = searcher.search(&*tantivy_query, &(top_docs_collector, Count))?;

        let mut documents = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            documents.push(ProductDocument::from_tantivy_doc(&doc, &self.fields)?);
        }

        Ok(IndexHits {
            documents,
            total_hits: total as u64,
        })
    }

    async fn delete_all(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer.delete_all_documents()?;
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    async fn bulk_insert(&self, documents: &[ProductDocument]) -> SearchResult<usize> {
        let mut writer = self.writer.write().await;

        for document in documents {
            writer.delete_term(Term::from_field_text(self.fields.id, &document.id));
            writer.add_document(document.to_tantivy_doc(&self.fields))?;
        }

        writer.commit()?;
        self.reader.reload()?;
        *self.last_commit.write().await = Some(Utc::now());

        Ok(documents.len())
    }

    async fn stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();

        Ok(IndexStats {
            total_documents: searcher.num_docs(),
            num_segments: searcher.segment_readers().len(),
            last_commit: *self.last_commit.read().await,
        })
    }
}
