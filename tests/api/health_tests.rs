//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::TestApp;

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("version").is_some());
}

/// Test liveness probe endpoint
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

/// Test readiness with only in-memory backends
#[tokio::test]
async fn test_readiness_in_memory() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["checks"].get("database").is_none());
}

/// Test the Prometheus endpoint exposes request counters
#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new().await;
    app.get("/health").await;

    let response = app
        .request(axum::http::Method::GET, "/metrics", None, None)
        .await;

    // Text exposition format is not JSON
    assert_eq!(response.0, StatusCode::OK);
}
