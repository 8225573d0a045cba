//! Prometheus metrics for status-service.
//!
//! Collectors live in the default registry and are rendered at `/metrics`.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Post admissions by outcome (created, invalid, unauthenticated, rate_limited, error).
    pub static ref POST_ADMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "status_post_admissions_total",
        "Post creation attempts segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register status_post_admissions_total");

    /// Feed reads by procedure and result.
    pub static ref FEED_READS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "status_feed_reads_total",
        "Feed reads segmented by procedure and result",
        &["procedure", "result"]
    )
    .expect("failed to register status_feed_reads_total");

    /// Identity provider round-trip latency.
    pub static ref IDENTITY_LOOKUP_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "status_identity_lookup_duration_seconds",
        "Identity provider lookup latency segmented by operation",
        &["operation"]
    )
    .expect("failed to register status_identity_lookup_duration_seconds");

    /// HTTP request latency recorded by `MetricsMiddleware`.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "status_http_request_duration_seconds",
        "HTTP request latency segmented by method, route and status",
        &["method", "route", "status"]
    )
    .expect("failed to register status_http_request_duration_seconds");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
