use crate::catalog::{
    duplicate_category_name, missing_category, validate_category, validate_product, CatalogStore,
};
use crate::error::Result;
use crate::models::{CanonicalProduct, Category, ProductRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory catalog store (for development and testing)
#[derive(Clone)]
pub struct InMemoryCatalogStore {
    categories: Arc<DashMap<u64, Category>>,
    products: Arc<DashMap<u64, ProductRecord>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            categories: Arc::new(DashMap::new()),
            products: Arc::new(DashMap::new()),
        }
    }

    fn join(&self, record: ProductRecord) -> CanonicalProduct {
        let category = self
            .categories
            .get(&record.category_id)
            .map(|entry| entry.clone());
        record.into_canonical(category)
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn save_category(&self, category: &Category) -> Result<()> {
        validate_category(category)?;

        if let Some(existing) = self
            .categories
            .iter()
            .find(|entry| entry.name == category.name && entry.id != category.id)
        {
            return Err(duplicate_category_name(category, existing.id));
        }

        self.categories.insert(category.id, category.clone());
        tracing::debug!(category_id = category.id, "Category saved");
        Ok(())
    }

    async fn get_category(&self, id: u64) -> Result<Option<Category>> {
        Ok(self.categories.get(&id).map(|entry| entry.clone()))
    }

    async fn save_product(&self, product: &ProductRecord) -> Result<()> {
        validate_product(product)?;

        if !self.categories.contains_key(&product.category_id) {
            return Err(missing_category(product));
        }

        self.products.insert(product.id, product.clone());
        tracing::debug!(product_id = product.id, "Product saved");
        Ok(())
    }

    async fn get_product(&self, id: u64) -> Result<Option<CanonicalProduct>> {
        let record = self.products.get(&id).map(|entry| entry.clone());
        Ok(record.map(|record| self.join(record)))
    }

    async fn list_all_products(&self) -> Result<Vec<CanonicalProduct>> {
        let mut records: Vec<ProductRecord> =
            self.products.iter().map(|entry| entry.clone()).collect();
        records.sort_by_key(|record| record.id);

        Ok(records.into_iter().map(|record| self.join(record)).collect())
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.products.len() as u64)
    }
}
