//! Bulk catalog loading from JSON seed files

use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::models::{Category, ProductRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Categories and products to load into a catalog store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub products: Vec<ProductRecord>,
}

impl CatalogSeed {
    /// Read a seed from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub categories: usize,
    pub products: usize,
}

/// Load a seed into the store, categories first.
///
/// Stops at the first rejected record; rows saved before it stay saved.
pub async fn import_seed(store: &dyn CatalogStore, seed: &CatalogSeed) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for category in &seed.categories {
        store.save_category(category).await?;
        summary.categories += 1;
    }

    for product in &seed.products {
        store.save_product(product).await?;
        summary.products += 1;
    }

    tracing::info!(
        categories = summary.categories,
        products = summary.products,
        "Catalog seed imported"
    );

    Ok(summary)
}
