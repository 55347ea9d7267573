//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use catalog_search::catalog::{CatalogStore, InMemoryCatalogStore};
use catalog_search::error::{AppError, Result};
use catalog_search::models::{CanonicalProduct, Category, ProductRecord};
use catalog_search::search::{
    IndexHits, IndexStats, IndexStore, IndexSyncEngine, ProductDocument, SearchError,
    SearchQuery, SearchResult, SmartSearchService, TantivyIndexStore,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Notify;

pub const WRITER_HEAP: usize = 50_000_000;

pub fn dec(text: &str) -> Decimal {
    text.parse().unwrap()
}

/// Small storefront catalog used across tests
pub async fn seed_catalog() -> Arc<InMemoryCatalogStore> {
    let catalog = Arc::new(InMemoryCatalogStore::new());

    for category in [
        Category::new(1, "Footwear"),
        Category::new(2, "Electronics").with_description("Gadgets and accessories"),
        Category::new(3, "Books"),
    ] {
        catalog.save_category(&category).await.unwrap();
    }

    let products = [
        (1, "Trail Running Shoes", "Lightweight running shoes for rough terrain", "1999.00", 1),
        (2, "Leather Formal Shoes", "Polished office footwear", "3499.00", 1),
        (3, "Canvas Sneakers", "Casual everyday shoes", "999.00", 1),
        (4, "Budget Smartphone", "Dual SIM phone with long battery", "7999.00", 2),
        (5, "Flagship Smartphone", "Premium phone with triple camera", "64999.00", 2),
        (6, "Wireless Headphones", "Noise cancelling over-ear headphones", "1499.50", 2),
        (7, "Rust Programming Guide", "Learn systems programming", "499.00", 3),
        (8, "Cookbook", "Recipes from around the world", "350.00", 3),
        (9, "Gaming Laptop", "High refresh rate display", "89999.00", 2),
        (10, "Laptop Sleeve", "Padded sleeve for 15 inch machines", "799.00", 2),
        (11, "Running Shoes Pro", "Race day shoes", "2000.00", 1),
        (12, "Running Shoes Max", "Cushioned shoes", "2000.01", 1),
    ];

    for (id, name, description, price, category_id) in products {
        catalog
            .save_product(
                &ProductRecord::new(id, name, dec(price), category_id).with_description(description),
            )
            .await
            .unwrap();
    }

    catalog
}

/// Service over a freshly synced in-memory index
pub async fn synced_service() -> (SmartSearchService, Arc<TantivyIndexStore>, IndexSyncEngine) {
    let catalog = seed_catalog().await;
    let index = Arc::new(TantivyIndexStore::in_memory(WRITER_HEAP).unwrap());
    let engine = IndexSyncEngine::new(catalog, index.clone());
    engine.sync_all().await.unwrap();

    (SmartSearchService::new(index.clone()), index, engine)
}

pub fn ids(documents: &[ProductDocument]) -> Vec<String> {
    documents.iter().map(|d| d.id.clone()).collect()
}

/// Index that refuses every request
pub struct FailingIndex;

#[async_trait]
impl IndexStore for FailingIndex {
    async fn search(&self, _query: &SearchQuery) -> SearchResult<IndexHits> {
        Err(SearchError::IndexUnavailable("connection refused".to_string()))
    }

    async fn delete_all(&self) -> SearchResult<()> {
        Err(SearchError::IndexUnavailable("connection refused".to_string()))
    }

    async fn bulk_insert(&self, _documents: &[ProductDocument]) -> SearchResult<usize> {
        Err(SearchError::IndexUnavailable("connection refused".to_string()))
    }

    async fn stats(&self) -> SearchResult<IndexStats> {
        Err(SearchError::IndexUnavailable("connection refused".to_string()))
    }
}

/// Index whose wipe blocks until released
pub struct GatedIndex {
    pub inner: TantivyIndexStore,
    pub gate: Arc<Notify>,
}

impl GatedIndex {
    pub fn new() -> Self {
        Self {
            inner: TantivyIndexStore::in_memory(WRITER_HEAP).unwrap(),
            gate: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl IndexStore for GatedIndex {
    async fn search(&self, query: &SearchQuery) -> SearchResult<IndexHits> {
        self.inner.search(query).await
    }

    async fn delete_all(&self) -> SearchResult<()> {
        self.gate.notified().await;
        self.inner.delete_all().await
    }

    async fn bulk_insert(&self, documents: &[ProductDocument]) -> SearchResult<usize> {
        self.inner.bulk_insert(documents).await
    }

    async fn stats(&self) -> SearchResult<IndexStats> {
        self.inner.stats().await
    }
}

/// Index whose wipe succeeds but whose inserts are refused
pub struct InsertFailsIndex {
    pub inner: Arc<TantivyIndexStore>,
}

#[async_trait]
impl IndexStore for InsertFailsIndex {
    async fn search(&self, query: &SearchQuery) -> SearchResult<IndexHits> {
        self.inner.search(query).await
    }

    async fn delete_all(&self) -> SearchResult<()> {
        self.inner.delete_all().await
    }

    async fn bulk_insert(&self, _documents: &[ProductDocument]) -> SearchResult<usize> {
        Err(SearchError::IndexUnavailable("bulk request rejected".to_string()))
    }

    async fn stats(&self) -> SearchResult<IndexStats> {
        self.inner.stats().await
    }
}

/// Catalog holding one product whose category reference is dangling
pub struct OrphanCatalog;

#[async_trait]
impl CatalogStore for OrphanCatalog {
    async fn save_category(&self, _category: &Category) -> Result<()> {
        Err(AppError::Internal("read-only".to_string()))
    }

    async fn get_category(&self, _id: u64) -> Result<Option<Category>> {
        Ok(None)
    }

    async fn save_product(&self, _product: &ProductRecord) -> Result<()> {
        Err(AppError::Internal("read-only".to_string()))
    }

    async fn get_product(&self, id: u64) -> Result<Option<CanonicalProduct>> {
        Ok((id == 77).then(|| ProductRecord::new(77, "Orphan Lamp", dec("250"), 404).into_canonical(None)))
    }

    async fn list_all_products(&self) -> Result<Vec<CanonicalProduct>> {
        Ok(vec![
            ProductRecord::new(77, "Orphan Lamp", dec("250"), 404).into_canonical(None)
        ])
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(1)
    }
}
