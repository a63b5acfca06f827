//! Authentication API Tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_USERNAME, VALID_CAPTCHA};

fn registration(username: &str, email: &str, captcha: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "password": "ValidPassword123",
        "captcha_token": captcha
    })
}

/// Test user registration with valid data
#[tokio::test]
async fn test_register_with_valid_data() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/v1/auth/register",
            registration("new_member", "new.member@example.com", VALID_CAPTCHA),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_successful"], true);
    assert_eq!(body["error_category"], "None");
    assert!(body["data"].as_i64().unwrap() > 0);
}

/// Test registration is refused before validation when the captcha fails
#[tokio::test]
async fn test_register_with_bad_captcha_fails() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/v1/auth/register",
            registration("new_member", "new.member@example.com", "forged"),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_successful"], false);
    assert_eq!(body["error_category"], "DataSubmittedInvalid");
    assert_eq!(body["message"], "The captcha token is invalid.");
    assert!(body["data"].is_null());
}

/// Test registration fails with a short username and a malformed email together
#[tokio::test]
async fn test_register_reports_every_structural_violation() {
    let app = TestApp::new().await;

    let (_, body) = app
        .post_json(
            "/api/v1/auth/register",
            registration("short", "not-an-email", VALID_CAPTCHA),
        )
        .await;

    assert_eq!(body["error_category"], "BusinessValidation");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Username"), "{}", message);
    assert!(message.contains("Email"), "{}", message);
}

/// Test duplicate usernames are rejected case-insensitively
#[tokio::test]
async fn test_register_duplicate_username_fails() {
    let app = TestApp::new().await;
    app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, body) = app
        .post_json(
            "/api/v1/auth/register",
            registration("Andrea_Rossi", "someone.else@example.com", VALID_CAPTCHA),
        )
        .await;

    assert_eq!(body["error_category"], "BusinessValidation");
    assert_eq!(body["message"], "Username is already registered.");
}

/// Test login returns a bearer token
#[tokio::test]
async fn test_login_with_valid_credentials() {
    let app = TestApp::new().await;
    let id = app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_successful"], true);
    assert_eq!(body["data"]["user_id"], id);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
}

/// Test wrong password and unknown user give different messages
#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new().await;
    app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, wrong) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "username": ADMIN_USERNAME, "password": "wrong-password" }),
        )
        .await;
    let (_, unknown) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "username": "nobody_at_all", "password": ADMIN_PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(wrong["error_category"], "Authentication");
    assert_eq!(wrong["message"], "Incorrect username or password.");
    assert!(wrong["data"].is_null());
    assert_eq!(unknown["message"], "User not found.");
}

/// Test an unreadable body still answers with an envelope
#[tokio::test]
async fn test_malformed_body_is_an_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some("{not json".to_string()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_successful"], false);
    assert_eq!(body["error_category"], "DataSubmittedInvalid");
}

/// Test the passcode flow: generate, receive by email, log in
#[tokio::test]
async fn test_otp_login_flow() {
    let app = TestApp::new().await;
    app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, generated) = app
        .post_json("/api/v1/otp/generate", json!({ "email": ADMIN_EMAIL }))
        .await;
    assert_eq!(generated["is_successful"], true, "{}", generated["message"]);
    assert_eq!(app.mailbox.sent().len(), 1);
    let code = app.mailbox.last_code_for(ADMIN_EMAIL).expect("passcode email");

    let (_, checked) = app
        .post_json(
            "/api/v1/otp/validate",
            json!({ "email": ADMIN_EMAIL, "otp": code }),
        )
        .await;
    assert_eq!(checked["is_successful"], true);

    let (_, login) = app
        .post_json(
            "/api/v1/auth/login/otp",
            json!({ "email": ADMIN_EMAIL, "otp": code }),
        )
        .await;
    assert_eq!(login["is_successful"], true, "{}", login["message"]);
    assert_eq!(login["data"]["username"], ADMIN_USERNAME);
}

/// Test a wrong passcode is refused and the right one still works afterwards
#[tokio::test]
async fn test_otp_wrong_code_keeps_stored_code() {
    let app = TestApp::new().await;
    app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.post_json("/api/v1/otp/generate", json!({ "email": ADMIN_EMAIL }))
        .await;
    let code = app.mailbox.last_code_for(ADMIN_EMAIL).unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (_, refused) = app
        .post_json(
            "/api/v1/auth/login/otp",
            json!({ "email": ADMIN_EMAIL, "otp": wrong }),
        )
        .await;
    let (_, accepted) = app
        .post_json(
            "/api/v1/auth/login/otp",
            json!({ "email": ADMIN_EMAIL, "otp": code }),
        )
        .await;

    assert_eq!(refused["message"], "The OTP is incorrect.");
    assert_eq!(accepted["is_successful"], true);
}

/// Test empty passcode is reported without a lookup
#[tokio::test]
async fn test_otp_empty_code() {
    let app = TestApp::new().await;

    let (_, body) = app
        .post_json(
            "/api/v1/otp/validate",
            json!({ "email": ADMIN_EMAIL, "otp": "" }),
        )
        .await;

    assert_eq!(body["error_category"], "UserInput");
    assert_eq!(body["message"], "OTP not submitted.");
}

/// Test password reset authorised by a passcode
#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new().await;
    app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.post_json("/api/v1/otp/generate", json!({ "email": ADMIN_EMAIL }))
        .await;
    let code = app.mailbox.last_code_for(ADMIN_EMAIL).unwrap();

    let (_, reset) = app
        .post_json(
            "/api/v1/auth/password/reset",
            json!({ "email": ADMIN_EMAIL, "otp": code, "new_password": "a-new-password" }),
        )
        .await;
    assert_eq!(reset["is_successful"], true, "{}", reset["message"]);

    let (_, old) = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(old["is_successful"], false);
    app.login(ADMIN_USERNAME, "a-new-password").await;
}

/// Test password reset without a generated passcode
#[tokio::test]
async fn test_password_reset_without_otp_fails() {
    let app = TestApp::new().await;
    app.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, reset) = app
        .post_json(
            "/api/v1/auth/password/reset",
            json!({ "email": ADMIN_EMAIL, "otp": "123456", "new_password": "a-new-password" }),
        )
        .await;

    assert_eq!(reset["message"], "The OTP has expired or was never generated.");
}

/// Test email and username shape checks
#[tokio::test]
async fn test_shape_checks() {
    let app = TestApp::new().await;

    let (_, good_email) = app
        .get("/api/v1/auth/validate/email?email=someone%40example.com")
        .await;
    let (_, bad_email) = app.get("/api/v1/auth/validate/email?email=nope").await;
    let (_, good_name) = app
        .get("/api/v1/auth/validate/username?username=andrea_rossi")
        .await;
    let (_, bad_name) = app.get("/api/v1/auth/validate/username?username=ab").await;

    assert_eq!(good_email["is_successful"], true);
    assert_eq!(bad_email["message"], "The email is not in a valid format.");
    assert_eq!(good_name["is_successful"], true);
    assert_eq!(bad_name["message"], "The username is not in a valid format.");
}

/// Test `/me` and logout revoking the token
#[tokio::test]
async fn test_me_and_logout() {
    let app = TestApp::new().await;
    let (id, token) = app.admin_token().await;

    let (status, me) = app.get_auth("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["id"], id);
    assert!(me["data"].get("password").is_none());

    let (_, logout) = app.post_auth("/api/v1/auth/logout", &token).await;
    assert_eq!(logout["is_successful"], true);

    let (status, _) = app.get_auth("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
