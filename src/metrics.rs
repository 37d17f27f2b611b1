// Prometheus metrics definitions for the coaching backend.

use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Total HTTP requests served, by method/route template/status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pubg_coach_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    /// Calls made to the PUBG stats API, by endpoint and outcome.
    pub static ref STATS_API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pubg_coach_stats_api_requests_total", "Calls to the PUBG stats API"),
        &["endpoint", "outcome"],
    )
    .unwrap();

    /// Completion requests, by provider and outcome.
    pub static ref LLM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pubg_coach_llm_requests_total", "Text generation requests"),
        &["provider", "outcome"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// HTTP request duration in seconds, by route template.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pubg_coach_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap();

    /// Completion latency in seconds, by provider.
    pub static ref LLM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pubg_coach_llm_request_duration_seconds",
            "Text generation latency in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["provider"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(STATS_API_REQUESTS_TOTAL.clone()),
        Box::new(LLM_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        Box::new(LLM_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::debug!("Metric not registered: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
