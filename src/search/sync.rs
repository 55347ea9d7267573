//! Catalog to index synchronization

use crate::catalog::CatalogStore;
use crate::metrics::{INDEX_DOCUMENTS, INDEX_SYNC_DURATION_SECONDS, INDEX_SYNC_RUNS_TOTAL};
use crate::search::document::{CatalogProjector, ProductDocument};
use crate::search::error::{SearchError, SearchResult};
use crate::search::index::IndexStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Outcome of a completed sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub sync_id: Uuid,
    pub documents_indexed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Rebuilds the search index from the catalog.
///
/// A sync replaces the index wholesale: every document is projected first,
/// then the index is wiped and refilled. Searches that land between the wipe
/// and the insert see an empty index. Runs are not serialized here; callers
/// that can overlap go through [`SyncTrigger`].
pub struct IndexSyncEngine {
    catalog: Arc<dyn CatalogStore>,
    index: Arc<dyn IndexStore>,
    projector: CatalogProjector,
}

impl IndexSyncEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, index: Arc<dyn IndexStore>) -> Self {
        Self {
            catalog,
            index,
            projector: CatalogProjector::new(),
        }
    }

    /// Replace the index contents with a projection of the whole catalog.
    ///
    /// A product without a category aborts the run before the index is
    /// touched. A failure after the wipe leaves the index empty or partial
    /// until the next successful run.
    pub async fn sync_all(&self) -> SearchResult<SyncReport> {
        let sync_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = INDEX_SYNC_DURATION_SECONDS.start_timer();

        info!(%sync_id, "Starting index sync");

        let result = self.rebuild(sync_id).await;
        timer.observe_duration();

        match result {
            Ok(documents_indexed) => {
                let finished_at = Utc::now();
                let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

                INDEX_SYNC_RUNS_TOTAL.with_label_values(&["success"]).inc();
                INDEX_DOCUMENTS.set(documents_indexed as f64);

                info!(
                    %sync_id,
                    documents_indexed,
                    duration_ms,
                    "✅ Index sync completed"
                );

                Ok(SyncReport {
                    sync_id,
                    documents_indexed,
                    started_at,
                    finished_at,
                    duration_ms,
                })
            }
            Err(e) => {
                INDEX_SYNC_RUNS_TOTAL.with_label_values(&["failure"]).inc();
                error!(%sync_id, error = %e, "Index sync failed");
                Err(e)
            }
        }
    }

    async fn rebuild(&self, sync_id: Uuid) -> SearchResult<usize> {
        let products = self
            .catalog
            .list_all_products()
            .await
            .map_err(|e| SearchError::Catalog(e.to_string()))?;

        let documents = products
            .iter()
            .map(|product| self.projector.project(product))
            .collect::<SearchResult<Vec<ProductDocument>>>()?;

        info!(%sync_id, products = documents.len(), "Catalog projected");

        self.index.delete_all().await?;

        if documents.is_empty() {
            return Ok(0);
        }

        self.index.bulk_insert(&documents).await
    }
}

/// Single-flight entry point for syncs that can be triggered concurrently
pub struct SyncTrigger {
    engine: Arc<IndexSyncEngine>,
    in_flight: Mutex<()>,
}

impl SyncTrigger {
    pub fn new(engine: Arc<IndexSyncEngine>) -> Self {
        Self {
            engine,
            in_flight: Mutex::new(()),
        }
    }

    /// Run a sync unless one is already running.
    ///
    /// Returns `None` without touching the index when another run holds the
    /// slot.
    pub async fn try_sync(&self) -> Option<SearchResult<SyncReport>> {
        let _guard = self.in_flight.try_lock().ok()?;
        Some(self.engine.sync_all().await)
    }

    /// Whether a sync is currently running
    pub fn is_running(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }
}

/// Populate the index once the service is up.
///
/// Failures are logged and swallowed so the service keeps serving whatever
/// the index already holds.
pub async fn run_startup_sync(trigger: Arc<SyncTrigger>) -> Option<SyncReport> {
    match trigger.try_sync().await {
        Some(Ok(report)) => Some(report),
        Some(Err(e)) => {
            error!(error = %e, "Startup index sync failed; serving existing index");
            None
        }
        None => {
            warn!("Startup index sync skipped; another sync is running");
            None
        }
    }
}
