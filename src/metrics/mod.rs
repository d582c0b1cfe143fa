//! Prometheus metrics for the content index manager.
//!
//! Covers HTTP traffic, index rebuilds and filter token parsing. Metrics are
//! created lazily and registered on [`PROMETHEUS_REGISTRY`] by
//! [`init_metrics`]; [`gather_metrics`] renders the text exposition format.
//!
//! # Example
//! ```no_run
//! use content_index_manager::metrics::REBUILDS_STARTED_TOTAL;
//!
//! REBUILDS_STARTED_TOTAL
//!     .with_label_values(&["ExternalIndex"])
//!     .inc();
//! ```

mod middleware;

pub use middleware::track_metrics;

use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

const NAMESPACE: &str = "content_index_manager";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Rebuild Metrics
    // ============================================================================

    /// Rebuilds handed to a background task
    ///
    /// Labels: index
    pub static ref REBUILDS_STARTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rebuilds_started_total", "Total number of index rebuilds started")
            .namespace(NAMESPACE),
        &["index"]
    ).expect("Failed to create REBUILDS_STARTED_TOTAL metric");

    /// Labels: index
    pub static ref REBUILDS_COMPLETED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rebuilds_completed_total", "Total number of index rebuilds completed")
            .namespace(NAMESPACE),
        &["index"]
    ).expect("Failed to create REBUILDS_COMPLETED_TOTAL metric");

    /// Failed, timed out or panicked rebuilds
    ///
    /// Labels: index
    pub static ref REBUILD_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rebuild_failures_total", "Total number of failed index rebuilds")
            .namespace(NAMESPACE),
        &["index"]
    ).expect("Failed to create REBUILD_FAILURES_TOTAL metric");

    /// Labels: index
    /// Buckets: 0.1s to 1h
    pub static ref REBUILD_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "rebuild_duration_seconds",
            "Index rebuild duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
        &["index"]
    ).expect("Failed to create REBUILD_DURATION_SECONDS metric");

    /// Indexes currently held by a rebuild task
    pub static ref REBUILDS_IN_FLIGHT: Gauge = Gauge::with_opts(
        Opts::new("rebuilds_in_flight", "Number of index rebuilds in progress")
            .namespace(NAMESPACE)
    ).expect("Failed to create REBUILDS_IN_FLIGHT metric");

    // ============================================================================
    // Query Metrics
    // ============================================================================

    /// Labels: outcome (parsed, unrecognized)
    pub static ref FILTER_TOKENS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("filter_tokens_total", "Total number of filter tokens seen")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create FILTER_TOKENS_TOTAL metric");
}

/// Register every metric on [`PROMETHEUS_REGISTRY`]
///
/// Call once at startup; a second call fails with `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(REBUILDS_STARTED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(REBUILDS_COMPLETED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(REBUILD_FAILURES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(REBUILD_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(REBUILDS_IN_FLIGHT.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(FILTER_TOKENS_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Render the registry in Prometheus text format
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
