pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::search::{run_startup_sync, SearchConfig, SmartSearchService, SyncTrigger};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SmartSearchService>,
    pub sync: Arc<SyncTrigger>,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(search: Arc<SmartSearchService>, sync: Arc<SyncTrigger>) -> Self {
        let defaults = SearchConfig::default();
        Self {
            search,
            sync,
            default_page_size: defaults.default_page_size,
            max_page_size: defaults.max_page_size,
            started_at: Instant::now(),
        }
    }

    /// Apply page size limits from configuration
    pub fn with_page_limits(mut self, config: &SearchConfig) -> Self {
        self.default_page_size = config.default_page_size;
        self.max_page_size = config.max_page_size;
        self
    }
}

/// Serve `router` on `listener` until the server stops.
///
/// When a trigger is given, one index sync is started after the server task
/// is running, so requests are answered while the index fills.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    startup_sync: Option<Arc<SyncTrigger>>,
) -> std::io::Result<()> {
    let server = tokio::spawn(async move { axum::serve(listener, router).await });

    if let Some(trigger) = startup_sync {
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            run_startup_sync(trigger).await;
        });
    }

    server.await.map_err(std::io::Error::other)?
}
