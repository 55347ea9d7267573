use catalog_search::{
    api::{build_router, serve, AppState},
    catalog::create_store,
    config::Config,
    search::{IndexSyncEngine, SmartSearchService, SyncTrigger, TantivyIndexStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "catalog_search={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Some(e) = config_error {
        tracing::warn!("Failed to load configuration: {}", e);
        tracing::warn!("Using default configuration");
    }

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = catalog_search::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Initialize catalog backend
    tracing::info!("Catalog backend: {:?}", config.catalog.backend);
    let catalog = create_store(&config.catalog)?;
    tracing::info!("✅ Catalog store initialized");

    // Initialize search index
    let index = Arc::new(TantivyIndexStore::new(&config.search)?);
    tracing::info!(path = ?config.search.index_path, "✅ Search index opened");

    let search = Arc::new(SmartSearchService::new(index.clone()));
    let sync = Arc::new(SyncTrigger::new(Arc::new(IndexSyncEngine::new(
        catalog, index,
    ))));

    let state = AppState::new(search, sync.clone()).with_page_limits(&config.search);
    let app = build_router(state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Search: http://{}/search?q=", http_addr);
    tracing::info!("   Sync: POST http://{}/sync", http_addr);

    let startup_sync = if config.search.startup_sync {
        Some(sync)
    } else {
        tracing::info!("⚠️  Startup index sync disabled in configuration");
        None
    };

    let http_handle = tokio::spawn(async move {
        if let Err(e) = serve(http_listener, app, startup_sync).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tracing::info!("Press Ctrl+C to shutdown");

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
