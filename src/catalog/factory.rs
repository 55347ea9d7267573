use crate::catalog::{CatalogStore, InMemoryCatalogStore, SledCatalogStore};
use crate::config::{CatalogBackend, CatalogConfig};
use crate::error::{AppError, Result};
use std::sync::Arc;

/// Create a catalog store based on configuration
pub fn create_store(config: &CatalogConfig) -> Result<Arc<dyn CatalogStore>> {
    match config.backend {
        CatalogBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled catalog backend");

            let store = SledCatalogStore::new(path)?;
            Ok(Arc::new(store))
        }

        CatalogBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn CatalogStore> {
    tracing::info!("Initializing in-memory catalog backend");
    Arc::new(InMemoryCatalogStore::new())
}
