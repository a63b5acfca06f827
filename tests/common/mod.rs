//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure. The application runs
//! over the in-memory stores and passcode cache, with a recording mailbox
//! and a captcha that accepts one fixed token.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use auth_backend::application::services::EntityOperations;
use auth_backend::config::Settings;
use auth_backend::domain::{CaptchaVerifier, EmailSender, User};
use auth_backend::infrastructure::cache::InMemoryOtpStore;
use auth_backend::infrastructure::external::TracingLogSink;
use auth_backend::shared::OperationResult;
use auth_backend::startup::{build_router, AppState, Collaborators};

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const VALID_CAPTCHA: &str = "valid-captcha";
pub const ADMIN_USERNAME: &str = "andrea_rossi";
pub const ADMIN_EMAIL: &str = "andrea.rossi@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// One email handed to the mailbox
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email sender that keeps every message in memory
#[derive(Default)]
pub struct Mailbox {
    sent: Mutex<Vec<SentEmail>>,
}

impl Mailbox {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }

    /// The 6-digit passcode in the latest message to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|email| email.to == to)
            .and_then(|email| {
                email
                    .body
                    .split(|c: char| !c.is_ascii_digit())
                    .find(|word| word.len() == 6)
                    .map(str::to_string)
            })
    }
}

#[async_trait]
impl EmailSender for Mailbox {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> OperationResult<bool> {
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        OperationResult::success(true, "Email sent successfully.")
    }
}

/// Captcha that accepts only [`VALID_CAPTCHA`]
pub struct FixedCaptcha;

#[async_trait]
impl CaptchaVerifier for FixedCaptcha {
    async fn validate(&self, token: &str) -> OperationResult<bool> {
        if token == VALID_CAPTCHA {
            OperationResult::success(true, "Captcha verified successfully.")
        } else {
            OperationResult::failure_data_submitted_invalid("The captcha token is invalid.")
        }
    }
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailbox: Arc<Mailbox>,
}

impl TestApp {
    /// Create a new test application over in-memory backends
    pub async fn new() -> Self {
        let settings = Settings::in_memory(JWT_SECRET).expect("test settings");
        let mailbox = Arc::new(Mailbox::default());
        let collaborators = Collaborators {
            otp_store: Arc::new(InMemoryOtpStore::new()),
            email_sender: mailbox.clone(),
            captcha: Arc::new(FixedCaptcha),
            log_sink: Arc::new(TracingLogSink),
        };
        let state = AppState::in_memory(settings, collaborators);

        Self {
            router: build_router(state.clone()),
            state,
            mailbox,
        }
    }

    /// Add a user straight through the service, returning its id
    pub async fn seed_user(&self, username: &str, email: &str, password: &str) -> i64 {
        let result = self
            .state
            .user_entities
            .add(Some(User::new(username, email, password)))
            .await;
        assert!(result.is_successful(), "seeding failed: {}", result.message());
        *result.data().expect("assigned id")
    }

    /// Seed the administrator and log in, returning its id and bearer token
    pub async fn admin_token(&self) -> (i64, String) {
        let id = self.seed_user(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let token = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        (id, token)
    }

    /// Log in over HTTP and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (_, body) = self
            .post_json(
                "/api/v1/auth/login",
                serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(body["is_successful"], true, "login failed: {}", body["message"]);
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Send a request and decode the JSON body (`Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("Content-Type", "application/json");
        }
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, Some(token)).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body.to_string()), None)
            .await
    }

    /// Make an authenticated request with JSON body
    pub async fn send_json_auth(
        &self,
        method: Method,
        uri: &str,
        body: Value,
        token: &str,
    ) -> (StatusCode, Value) {
        self.request(method, uri, Some(body.to_string()), Some(token))
            .await
    }

    /// Make an authenticated POST request without body
    pub async fn post_auth(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(token)).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_auth(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, Some(token)).await
    }
}
