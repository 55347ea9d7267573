//! HTTP API tests, mostly driven through the router without binding a socket

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_search::{
    api::{build_router, serve, AppState},
    catalog::CatalogStore,
    search::{
        IndexStore, IndexSyncEngine, SearchConfigBuilder, SmartSearchService, SyncTrigger,
        TantivyIndexStore,
    },
};
use common::*;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn app_with(
    index: Arc<dyn IndexStore>,
    catalog: Arc<dyn CatalogStore>,
) -> (Router, Arc<SyncTrigger>) {
    let search = Arc::new(SmartSearchService::new(index.clone()));
    let sync = Arc::new(SyncTrigger::new(Arc::new(IndexSyncEngine::new(catalog, index))));
    let config = SearchConfigBuilder::new()
        .default_page_size(5)
        .max_page_size(10)
        .build();

    let state = AppState::new(search, sync.clone()).with_page_limits(&config);
    (build_router(state), sync)
}

async fn seeded_app() -> Router {
    let index = Arc::new(TantivyIndexStore::in_memory(WRITER_HEAP).unwrap());
    let (app, _sync) = app_with(index, seed_catalog().await);
    app
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = seeded_app().await;

    let (status, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sync_running"], false);
}

#[tokio::test]
async fn test_sync_then_search() {
    let app = seeded_app().await;

    let (status, body) = send(&app, "POST", "/api/products/sync").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["documents_indexed"], 12);

    let (status, body) = send(&app, "GET", "/search?q=shoes%20under%202000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_hits"], 3);
    assert_eq!(body["page"], 0);
    assert_eq!(body["size"], 5);

    for product in body["content"].as_array().unwrap() {
        let price: f64 = product["price"].as_str().unwrap().parse().unwrap();
        assert!(price <= 2000.0);
    }
}

#[tokio::test]
async fn test_search_alias_and_pagination() {
    let app = seeded_app().await;
    send(&app, "POST", "/sync").await;

    let (status, body) = send(&app, "GET", "/api/products/search?q=shoes&page=1&size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_hits"], 5);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["content"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_page_size_is_clamped() {
    let app = seeded_app().await;
    send(&app, "POST", "/sync").await;

    let (_, body) = send(&app, "GET", "/search?q=under%20100000&size=500").await;
    assert_eq!(body["size"], 10);
    assert_eq!(body["content"].as_array().unwrap().len(), 10);
    assert_eq!(body["total_hits"], 12);
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = seeded_app().await;
    send(&app, "POST", "/sync").await;

    for uri in [
        "/search?q=shoes&page=1000000000000",
        "/search?q=shoes&page=18446744073709551615&size=10",
    ] {
        let (status, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_hits"], 5);
        assert!(body["content"].as_array().unwrap().is_empty());
    }

    // The server is still answering
    let (status, _) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_or_missing_query_is_empty_page() {
    let app = seeded_app().await;
    send(&app, "POST", "/sync").await;

    for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
        let (status, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_hits"], 0);
        assert!(body["content"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_unavailable_index_is_503() {
    let (app, _sync) = app_with(Arc::new(FailingIndex), seed_catalog().await);

    let (status, body) = send(&app, "GET", "/search?q=laptop").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "INDEX_UNAVAILABLE");

    let (status, _) = send(&app, "POST", "/sync").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_integrity_failure_is_500() {
    let index = Arc::new(TantivyIndexStore::in_memory(WRITER_HEAP).unwrap());
    let (app, _sync) = app_with(index, Arc::new(OrphanCatalog));

    let (status, body) = send(&app, "POST", "/sync").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "DATA_INTEGRITY_ERROR");
}

#[tokio::test]
async fn test_overlapping_sync_is_409() {
    let index = Arc::new(GatedIndex::new());
    let gate = index.gate.clone();
    let (app, sync) = app_with(index, seed_catalog().await);

    let first = tokio::spawn({
        let app = app.clone();
        async move { send(&app, "POST", "/sync").await }
    });

    tokio::time::timeout(Duration::from_secs(5), async {
        while !sync.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    let (status, body) = send(&app, "POST", "/sync").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    gate.notify_one();
    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = seeded_app().await;
    send(&app, "GET", "/search?q=laptop").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_startup_sync_runs_while_server_answers() {
    let index = Arc::new(GatedIndex::new());
    let gate = index.gate.clone();
    let (app, sync) = app_with(index, seed_catalog().await);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(serve(listener, app, Some(sync.clone())));

    let client = reqwest::Client::new();

    // Health is served while the startup sync is held at the wipe
    let health: Value = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(response) = client.get(format!("{}/health", base)).send().await {
                let body: Value = response.json().await.unwrap();
                if body["sync_running"] == true {
                    return body;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(health["status"], "healthy");

    gate.notify_one();
    tokio::time::timeout(Duration::from_secs(5), async {
        while sync.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let body: Value = client
        .get(format!("{}/search?q=shoes", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_hits"], 5);
}
