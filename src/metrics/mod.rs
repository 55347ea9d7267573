//! Prometheus metrics for the catalog search service.
//!
//! All metrics live in [`PROMETHEUS_REGISTRY`] under the `catalog_search`
//! namespace and are exported as text by [`gather_metrics`].

mod middleware;

pub use middleware::track_http_metrics;

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry,
};

const NAMESPACE: &str = "catalog_search";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Search Metrics
    // ============================================================================

    /// Searches received, by query shape
    ///
    /// Labels: variant (multi_field, price_filtered)
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("search_requests_total", "Total number of product searches")
            .namespace(NAMESPACE),
        &["variant"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    /// Searches that failed against the index
    pub static ref SEARCH_FAILURES_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("search_failures_total", "Total number of failed index searches")
            .namespace(NAMESPACE)
    ).expect("Failed to create SEARCH_FAILURES_TOTAL metric");

    /// Index query latency in seconds
    pub static ref SEARCH_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("search_duration_seconds", "Index query duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0])
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    // ============================================================================
    // Index Sync Metrics
    // ============================================================================

    /// Full index rebuilds, by outcome
    ///
    /// Labels: outcome (success, failure)
    pub static ref INDEX_SYNC_RUNS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("index_sync_runs_total", "Total number of index sync runs")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create INDEX_SYNC_RUNS_TOTAL metric");

    /// Documents written by the last successful sync
    pub static ref INDEX_DOCUMENTS: Gauge = Gauge::with_opts(
        Opts::new("index_documents", "Documents in the search index after the last sync")
            .namespace(NAMESPACE)
    ).expect("Failed to create INDEX_DOCUMENTS metric");

    /// Sync duration in seconds
    pub static ref INDEX_SYNC_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("index_sync_duration_seconds", "Index sync duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0])
    ).expect("Failed to create INDEX_SYNC_DURATION_SECONDS metric");
}

/// Register every metric with the global registry. Call once at startup.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    // Register HTTP metrics
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;

    // Register search metrics
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_FAILURES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;

    // Register sync metrics
    PROMETHEUS_REGISTRY.register(Box::new(INDEX_SYNC_RUNS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(INDEX_DOCUMENTS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(INDEX_SYNC_DURATION_SECONDS.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Encode all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
