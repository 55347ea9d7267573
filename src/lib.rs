//! Catalog browsing backend with a price-aware smart product search.
//!
//! The canonical catalog lives in a [`catalog::CatalogStore`]; a denormalized
//! tantivy index is rebuilt from it by [`search::IndexSyncEngine`] and queried
//! through [`search::SmartSearchService`].

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
