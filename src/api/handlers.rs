use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::search::{IndexStats, Pagination, SearchResultPage, SyncReport};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        sync_running: state.sync.is_running(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub sync_running: bool,
}

/// Prometheus scrape endpoint
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Smart product search
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResultPage>> {
    let page = Pagination::resolve(
        params.page,
        params.size,
        state.default_page_size,
        state.max_page_size,
    );

    let results = state
        .search
        .search(params.q.as_deref().unwrap_or_default(), page)
        .await?;

    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text query, possibly carrying a price phrase
    pub q: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

/// Rebuild the search index from the catalog
pub async fn sync_index(State(state): State<AppState>) -> Result<Json<SyncResponse>> {
    let report = state
        .sync
        .try_sync()
        .await
        .ok_or_else(|| AppError::Conflict("An index sync is already running".to_string()))??;

    Ok(Json(SyncResponse {
        message: "Synchronization successful".to_string(),
        report,
    }))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub report: SyncReport,
}

/// Index statistics
pub async fn index_stats(State(state): State<AppState>) -> Result<Json<IndexStats>> {
    Ok(Json(state.search.index_stats().await?))
}
