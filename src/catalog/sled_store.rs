use crate::catalog::{
    duplicate_category_name, missing_category, validate_category, validate_product, CatalogStore,
};
use crate::error::{AppError, Result};
use crate::models::{CanonicalProduct, Category, ProductRecord};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

/// Persistent catalog store using Sled embedded database
#[derive(Clone)]
pub struct SledCatalogStore {
    db: Arc<Db>,
    categories_tree: sled::Tree,
    category_names_tree: sled::Tree,
    products_tree: sled::Tree,
}

impl SledCatalogStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let open_tree = |name: &str| {
            db.open_tree(name).map_err(|e| {
                AppError::Database(format!("Failed to open {} tree: {}", name, e))
            })
        };

        let categories_tree = open_tree("categories")?;
        let category_names_tree = open_tree("category_names")?;
        let products_tree = open_tree("products")?;

        tracing::info!("Initialized Sled catalog store at {:?}", path.as_ref());

        Ok(Self {
            db: Arc::new(db),
            categories_tree,
            category_names_tree,
            products_tree,
        })
    }

    /// Big-endian so that tree iteration follows numeric id order
    fn id_key(id: u64) -> [u8; 8] {
        id.to_be_bytes()
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize record: {}", e)))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize record: {}", e)))
    }

    fn load_category(&self, id: u64) -> Result<Option<Category>> {
        match self.categories_tree.get(Self::id_key(id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn join(&self, record: ProductRecord) -> Result<CanonicalProduct> {
        let category = self.load_category(record.category_id)?;
        Ok(record.into_canonical(category))
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await.map_err(|e| {
            AppError::Database(format!("Failed to flush database: {}", e))
        })?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SledCatalogStore {
    async fn save_category(&self, category: &Category) -> Result<()> {
        validate_category(category)?;

        let name_key = category.name.as_bytes();
        if let Some(owner) = self.category_names_tree.get(name_key)? {
            let owner_id = u64::from_be_bytes(owner.as_ref().try_into().map_err(|_| {
                AppError::Database(format!("Corrupt name index entry for '{}'", category.name))
            })?);
            if owner_id != category.id {
                return Err(duplicate_category_name(category, owner_id));
            }
        }

        if let Some(previous) = self.load_category(category.id)? {
            if previous.name != category.name {
                self.category_names_tree.remove(previous.name.as_bytes())?;
            }
        }

        self.categories_tree
            .insert(Self::id_key(category.id), Self::encode(category)?)?;
        self.category_names_tree
            .insert(name_key, Self::id_key(category.id).to_vec())?;

        tracing::debug!(category_id = category.id, "Category saved to Sled");
        Ok(())
    }

    async fn get_category(&self, id: u64) -> Result<Option<Category>> {
        self.load_category(id)
    }

    async fn save_product(&self, product: &ProductRecord) -> Result<()> {
        validate_product(product)?;

        if !self
            .categories_tree
            .contains_key(Self::id_key(product.category_id))?
        {
            return Err(missing_category(product));
        }

        self.products_tree
            .insert(Self::id_key(product.id), Self::encode(product)?)?;

        // Flush to ensure durability
        self.products_tree.flush()?;

        tracing::debug!(product_id = product.id, "Product saved to Sled");
        Ok(())
    }

    async fn get_product(&self, id: u64) -> Result<Option<CanonicalProduct>> {
        match self.products_tree.get(Self::id_key(id))? {
            Some(bytes) => Ok(Some(self.join(Self::decode(&bytes)?)?)),
            None => Ok(None),
        }
    }

    async fn list_all_products(&self) -> Result<Vec<CanonicalProduct>> {
        let mut products = Vec::with_capacity(self.products_tree.len());

        for result in self.products_tree.iter() {
            let (_, value) = result.map_err(|e| {
                AppError::Database(format!("Failed to iterate products: {}", e))
            })?;
            products.push(self.join(Self::decode(&value)?)?);
        }

        Ok(products)
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.products_tree.len() as u64)
    }
}
