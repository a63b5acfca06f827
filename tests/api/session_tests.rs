//! Session and Access Token API Tests

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;

/// Test login records a session for the user
#[tokio::test]
async fn test_login_creates_session() {
    let app = TestApp::new().await;
    let (id, token) = app.admin_token().await;

    let (_, body) = app
        .get_auth(&format!("/api/v1/sessions/user/{}", id), &token)
        .await;

    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["token"], token.as_str());
    assert_eq!(sessions[0]["active"], true);
}

/// Test deactivating a session revokes its token
#[tokio::test]
async fn test_deactivated_session_revokes_token() {
    let app = TestApp::new().await;
    let (id, token) = app.admin_token().await;
    let other = app.login("andrea_rossi", "admin-password").await;

    let (_, body) = app
        .get_auth(&format!("/api/v1/sessions/user/{}", id), &token)
        .await;
    let first_session = body["data"][0]["id"].as_i64().unwrap();
    let (_, deactivated) = app
        .post_auth(
            &format!("/api/v1/sessions/{}/deactivate", first_session),
            &other,
        )
        .await;
    assert_eq!(deactivated["message"], "Session deactivated successfully.");

    let (revoked, _) = app.get_auth("/api/v1/sessions", &token).await;
    let (still_valid, _) = app.get_auth("/api/v1/sessions", &other).await;
    assert_eq!(revoked, StatusCode::UNAUTHORIZED);
    assert_eq!(still_valid, StatusCode::OK);
}

/// Test access token add and duplicate detection
#[tokio::test]
async fn test_access_token_duplicate() {
    let app = TestApp::new().await;
    let (id, token) = app.admin_token().await;
    let body = json!({
        "user_id": id,
        "token": "api-key-0001",
        "expiration": Utc::now() + Duration::days(30)
    });

    let (_, first) = app
        .send_json_auth(Method::POST, "/api/v1/access-tokens", body.clone(), &token)
        .await;
    let (_, second) = app
        .send_json_auth(Method::POST, "/api/v1/access-tokens", body, &token)
        .await;

    assert_eq!(first["message"], "Access token added successfully.");
    assert_eq!(second["error_category"], "BusinessValidation");
    assert_eq!(second["message"], "The access token is already registered.");
}

/// Test access token structural rules are aggregated
#[tokio::test]
async fn test_access_token_rules() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (_, body) = app
        .send_json_auth(
            Method::POST,
            "/api/v1/access-tokens",
            json!({
                "user_id": 0,
                "token": "api-key-0002",
                "expiration": Utc::now() - Duration::days(1)
            }),
            &token,
        )
        .await;

    let message = body["message"].as_str().unwrap();
    assert_eq!(body["error_category"], "BusinessValidation");
    assert!(message.contains("User id is required."), "{}", message);
    assert!(
        message.contains("Expiration must be later than the creation time."),
        "{}",
        message
    );
}

/// Test a missing access token
#[tokio::test]
async fn test_missing_access_token() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (_, body) = app.get_auth("/api/v1/access-tokens/999", &token).await;

    assert_eq!(body["error_category"], "NotFound");
    assert_eq!(body["message"], "The access token does not exist.");
}

/// Test deactivating or removing a user revokes that user's tokens
#[tokio::test]
async fn test_user_lifecycle_revokes_tokens() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin_token().await;
    let id = app
        .seed_user("marco_bianchi", "marco@example.com", "secret-password")
        .await;
    let token = app.login("marco_bianchi", "secret-password").await;
    let (status, _) = app.get_auth("/api/v1/users", &token).await;
    assert_eq!(status, StatusCode::OK);

    let (_, deactivated) = app
        .post_auth(&format!("/api/v1/users/{}/deactivate", id), &admin)
        .await;
    assert_eq!(deactivated["is_successful"], true);
    let (status, _) = app.get_auth("/api/v1/users", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, removed) = app.delete_auth(&format!("/api/v1/users/{}", id), &admin).await;
    assert_eq!(removed["is_successful"], true);
    let (status, _) = app.get_auth("/api/v1/users", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, sessions) = app
        .get_auth(&format!("/api/v1/sessions/user/{}", id), &admin)
        .await;
    assert_eq!(sessions["data"], json!([]));
}

/// Test a token row must belong to an existing user
#[tokio::test]
async fn test_session_for_unknown_user_fails() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (status, body) = app
        .send_json_auth(
            Method::POST,
            "/api/v1/sessions",
            json!({
                "user_id": 999,
                "token": "orphan-token",
                "expiration": Utc::now() + Duration::days(1)
            }),
            &token,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_category"], "BusinessValidation");
    assert_eq!(body["message"], "The user does not exist.");
}
