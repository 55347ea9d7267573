//! Price-aware product search powered by Tantivy
//!
//! Free text such as `"running shoes under 2000"` is split into a price
//! ceiling and a residual keyword, compiled into a fuzzy multi-field query
//! with an optional non-scoring price filter, and executed against an index
//! that is rebuilt wholesale from the catalog.
//!
//! # Architecture
//!
//! ```text
//! raw text ──▶ PriceIntentParser ──▶ QueryBuilder ──▶ SearchExecutor ──▶ IndexStore
//!                                                                           ▲
//! CatalogStore ──▶ CatalogProjector ──▶ IndexSyncEngine ────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use catalog_search::search::{Pagination, SearchConfig, SmartSearchService, TantivyIndexStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = Arc::new(TantivyIndexStore::new(&SearchConfig::default())?);
//!     let search = SmartSearchService::new(index);
//!
//!     let page = search.search("headphones below 1,500 rupees", Pagination::new(0, 10)).await?;
//!     println!("Found {} products", page.total_hits);
//!
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod error;
mod executor;
mod index;
mod price_intent;
mod query;
mod service;
mod sync;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{build_product_schema, CatalogProjector, ProductDocument, ProductFields};
pub use error::{SearchError, SearchResult};
pub use executor::{SearchExecutor, SearchResultPage};
pub use index::{IndexHits, IndexStats, IndexStore, TantivyIndexStore};
pub use price_intent::{
    strip_currency_tokens, PhraseShape, PriceIntent, PriceIntentParser, PricePhrase,
};
pub use query::{escape_query_text, FieldBoosts, Fuzziness, Pagination, QueryBuilder, SearchQuery};
pub use service::SmartSearchService;
pub use sync::{run_startup_sync, IndexSyncEngine, SyncReport, SyncTrigger};
