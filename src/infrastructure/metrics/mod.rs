//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, route, and status
//! - HTTP request latency histograms
//! - Repository operation outcomes by entity and operation
//! - Login attempts by method and outcome
//! - One-time passcodes issued
//! - External collaborator calls by service and outcome

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "auth_backend";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, route, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Repository operations by entity, operation and outcome ("success" or an error category)
pub static REPOSITORY_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "repository_operations_total",
            "Repository operations by entity, operation and outcome",
        )
        .namespace(NAMESPACE),
        &["entity", "operation", "outcome"],
    )
    .expect("Failed to create REPOSITORY_OPERATIONS_TOTAL metric")
});

/// Login attempts by method ("password", "otp") and outcome
pub static LOGIN_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("login_attempts_total", "Login attempts by method and outcome")
            .namespace(NAMESPACE),
        &["method", "outcome"],
    )
    .expect("Failed to create LOGIN_ATTEMPTS_TOTAL metric")
});

/// One-time passcodes generated and stored
pub static OTPS_ISSUED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("otps_issued_total", "One-time passcodes issued").namespace(NAMESPACE),
    )
    .expect("Failed to create OTPS_ISSUED_TOTAL metric")
});

/// Calls to external collaborators ("email", "captcha", "log_shipping")
pub static EXTERNAL_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "external_calls_total",
            "Calls to external collaborators by service and outcome",
        )
        .namespace(NAMESPACE),
        &["service", "outcome"],
    )
    .expect("Failed to create EXTERNAL_CALLS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(REPOSITORY_OPERATIONS_TOTAL.clone()))
        .expect("Failed to register REPOSITORY_OPERATIONS_TOTAL");
    registry
        .register(Box::new(LOGIN_ATTEMPTS_TOTAL.clone()))
        .expect("Failed to register LOGIN_ATTEMPTS_TOTAL");
    registry
        .register(Box::new(OTPS_ISSUED_TOTAL.clone()))
        .expect("Failed to register OTPS_ISSUED_TOTAL");
    registry
        .register(Box::new(EXTERNAL_CALLS_TOTAL.clone()))
        .expect("Failed to register EXTERNAL_CALLS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record a repository operation outcome
pub fn record_repository_operation(entity: &str, operation: &str, outcome: &str) {
    REPOSITORY_OPERATIONS_TOTAL
        .with_label_values(&[entity, operation, outcome])
        .inc();
}

/// Helper to record a login attempt
pub fn record_login_attempt(method: &str, outcome: &str) {
    LOGIN_ATTEMPTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
}

/// Helper to record an issued passcode
pub fn record_otp_issued() {
    OTPS_ISSUED_TOTAL.inc();
}

/// Helper to record an external call outcome
pub fn record_external_call(service: &str, outcome: &str) {
    EXTERNAL_CALLS_TOTAL
        .with_label_values(&[service, outcome])
        .inc();
}
