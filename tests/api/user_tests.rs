//! User API Tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;

const OTHER_NAMES: [&str; 16] = [
    "bianca", "carlos", "dimitri", "elena", "fabian", "greta", "hector", "ingrid", "jonas",
    "katrin", "lorenzo", "marta", "nikolai", "olivia", "pietro", "quentin",
];

/// Seventeen users in total, the administrator first
async fn seed_seventeen(app: &TestApp) -> String {
    let (_, token) = app.admin_token().await;
    for name in OTHER_NAMES {
        app.seed_user(
            &format!("{}_user", name),
            &format!("{}@example.com", name),
            "secret-password",
        )
        .await;
    }
    token
}

/// Test protected routes need a bearer token
#[tokio::test]
async fn test_users_require_authentication() {
    let app = TestApp::new().await;

    let (missing, _) = app.get("/api/v1/users").await;
    let (garbage, body) = app.get_auth("/api/v1/users", "not-a-jwt").await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "The token is invalid.");
}

/// Test add, retrieve, modify and remove
#[tokio::test]
async fn test_user_crud() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (_, added) = app
        .send_json_auth(
            Method::POST,
            "/api/v1/users",
            json!({ "username": "marco_bianchi", "email": "marco@example.com", "password": "secret-password" }),
            &token,
        )
        .await;
    assert_eq!(added["message"], "User added successfully.");
    let id = added["data"].as_i64().unwrap();

    let (_, fetched) = app.get_auth(&format!("/api/v1/users/{}", id), &token).await;
    assert_eq!(fetched["data"]["username"], "marco_bianchi");
    assert!(fetched["data"].get("password").is_none());

    let (_, modified) = app
        .send_json_auth(
            Method::PUT,
            &format!("/api/v1/users/{}", id),
            json!({ "username": "marco_bianchi", "email": "marco.b@example.com", "password": "another-password" }),
            &token,
        )
        .await;
    assert_eq!(modified["message"], "User modified successfully.");
    app.login("marco_bianchi", "another-password").await;

    let (_, removed) = app.delete_auth(&format!("/api/v1/users/{}", id), &token).await;
    assert_eq!(removed["is_successful"], true);

    let (status, gone) = app.get_auth(&format!("/api/v1/users/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gone["error_category"], "NotFound");
    assert_eq!(gone["message"], "The user does not exist.");
}

/// Test a null body is reported as missing data
#[tokio::test]
async fn test_add_null_user() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (_, body) = app
        .send_json_auth(Method::POST, "/api/v1/users", json!(null), &token)
        .await;

    assert_eq!(body["error_category"], "BusinessValidation");
    assert_eq!(body["message"], "The necessary data was not provided.");
}

/// Test deactivating twice succeeds both times and blocks login
#[tokio::test]
async fn test_deactivate_twice() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let id = app
        .seed_user("marco_bianchi", "marco@example.com", "secret-password")
        .await;
    let uri = format!("/api/v1/users/{}/deactivate", id);

    let (_, first) = app.post_auth(&uri, &token).await;
    let (_, second) = app.post_auth(&uri, &token).await;

    assert_eq!(first["is_successful"], true);
    assert_eq!(second["is_successful"], true);
    let (_, user) = app.get_auth(&format!("/api/v1/users/{}", id), &token).await;
    assert_eq!(user["data"]["active"], false);

    let (_, login) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "username": "marco_bianchi", "password": "secret-password" }),
        )
        .await;
    assert_eq!(login["message"], "The user account is deactivated.");

    let (_, activated) = app
        .post_auth(&format!("/api/v1/users/{}/activate", id), &token)
        .await;
    assert_eq!(activated["is_successful"], true);
    app.login("marco_bianchi", "secret-password").await;
}

/// Test id 0 is rejected before any lookup
#[tokio::test]
async fn test_remove_unassigned_id() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (_, body) = app.delete_auth("/api/v1/users/0", &token).await;

    assert_eq!(body["message"], "The necessary data was not provided.");
}

/// Test a non-numeric id is an envelope, not a 400
#[tokio::test]
async fn test_non_numeric_id() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (status, body) = app.get_auth("/api/v1/users/abc", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_category"], "DataSubmittedInvalid");
}

/// Test the first page of seventeen users
#[tokio::test]
async fn test_first_page() {
    let app = TestApp::new().await;
    let token = seed_seventeen(&app).await;

    let (_, body) = app
        .get_auth("/api/v1/users/page?page_number=0&page_size=3", &token)
        .await;

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["andrea_rossi", "bianca_user", "carlos_user"]);
}

/// Test filtered page and count agree
#[tokio::test]
async fn test_filter_andrea() {
    let app = TestApp::new().await;
    let token = seed_seventeen(&app).await;

    let (_, page) = app
        .get_auth("/api/v1/users/page?page_number=0&page_size=10&filter=Andrea", &token)
        .await;
    let (_, count) = app
        .get_auth("/api/v1/users/count?filter=Andrea", &token)
        .await;
    let (_, total) = app.get_auth("/api/v1/users/count", &token).await;

    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(count["data"], 1);
    assert_eq!(total["data"], 17);
}

/// Test negative paging arguments
#[tokio::test]
async fn test_negative_page() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let (_, body) = app
        .get_auth("/api/v1/users/page?page_number=-1&page_size=3", &token)
        .await;

    assert_eq!(body["error_category"], "UserInput");
}

/// Test the administrative password change
#[tokio::test]
async fn test_set_password() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    app.seed_user("marco_bianchi", "marco@example.com", "secret-password")
        .await;

    let (_, unknown) = app
        .send_json_auth(
            Method::PUT,
            "/api/v1/users/password",
            json!({ "email": "nobody@example.com", "new_password": "whatever-password" }),
            &token,
        )
        .await;
    let (_, changed) = app
        .send_json_auth(
            Method::PUT,
            "/api/v1/users/password",
            json!({ "email": "marco@example.com", "new_password": "whatever-password" }),
            &token,
        )
        .await;

    assert_eq!(unknown["message"], "The email is not registered.");
    assert_eq!(changed["is_successful"], true);
    app.login("marco_bianchi", "whatever-password").await;
}
