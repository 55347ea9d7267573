use crate::api::{handlers, AppState};
use crate::metrics::track_http_metrics;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Product search
        .route("/search", get(handlers::search_products))
        .route("/api/products/search", get(handlers::search_products))
        // Index maintenance
        .route("/sync", post(handlers::sync_index))
        .route("/api/products/sync", post(handlers::sync_index))
        .route("/index/stats", get(handlers::index_stats))
        // Per-route metrics, after routing so the matched path is known
        .route_layer(middleware::from_fn(track_http_metrics))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
