//! Canonical catalog storage
//!
//! The catalog is the source of truth for products and categories. The
//! search index is rebuilt from it and never written back.

pub mod factory;
pub mod import;
pub mod sled_store;
pub mod store;

pub use factory::{create_in_memory_store, create_store};
pub use import::{import_seed, CatalogSeed, ImportSummary};
pub use sled_store::SledCatalogStore;
pub use store::InMemoryCatalogStore;

use crate::error::{AppError, Result};
use crate::models::{CanonicalProduct, Category, ProductRecord};
use async_trait::async_trait;

/// Trait for catalog storage operations
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert or replace a category
    async fn save_category(&self, category: &Category) -> Result<()>;

    /// Get a category by ID
    async fn get_category(&self, id: u64) -> Result<Option<Category>>;

    /// Insert or replace a product. The referenced category must exist.
    async fn save_product(&self, product: &ProductRecord) -> Result<()>;

    /// Get a product by ID with its category loaded
    async fn get_product(&self, id: u64) -> Result<Option<CanonicalProduct>>;

    /// All products ordered by ID, each with its category loaded
    async fn list_all_products(&self) -> Result<Vec<CanonicalProduct>>;

    /// Number of stored products
    async fn count_products(&self) -> Result<u64>;
}

/// Field-level checks shared by every backend
pub(crate) fn validate_category(category: &Category) -> Result<()> {
    if category.name.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Category {} must have a name",
            category.id
        )));
    }
    Ok(())
}

pub(crate) fn validate_product(product: &ProductRecord) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Product {} must have a name",
            product.id
        )));
    }
    if product.price.is_sign_negative() && !product.price.is_zero() {
        return Err(AppError::Validation(format!(
            "Product {} has negative price {}",
            product.id, product.price
        )));
    }
    Ok(())
}

pub(crate) fn missing_category(product: &ProductRecord) -> AppError {
    AppError::Validation(format!(
        "Product {} references unknown category {}",
        product.id, product.category_id
    ))
}

pub(crate) fn duplicate_category_name(category: &Category, existing_id: u64) -> AppError {
    AppError::Validation(format!(
        "Category name '{}' is already used by category {}",
        category.name, existing_id
    ))
}
