//! Authentication Handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};

use super::{rejected, Envelope};
use crate::application::dto::{
    EmailQuery, LoginRequest, LoginResponse, OtpLoginRequest, PasswordResetRequest,
    RegisterRequest, UsernameQuery,
};
use crate::application::services::{EntityOperations, UserService};
use crate::domain::User;
use crate::presentation::middleware::AuthUser;
use crate::startup::AppState;

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Envelope<LoginResponse> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.users.login(&body.username, &body.password).await)
}

/// Login with a passcode sent by email
pub async fn login_otp(
    State(state): State<AppState>,
    body: Result<Json<OtpLoginRequest>, JsonRejection>,
) -> Envelope<LoginResponse> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.users.login_otp(&body.email, &body.otp).await)
}

/// Register a new user (captcha checked first)
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Envelope<i64> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.users.register(body).await)
}

/// Reset a forgotten password (passcode checked first)
pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Envelope<bool> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(
        state
            .users
            .reset_password(&body.email, &body.otp, &body.new_password)
            .await,
    )
}

/// Check the shape of an email address
pub async fn validate_email(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Envelope<bool> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.users.validate_email(&query.email))
}

/// Check the shape of a username
pub async fn validate_username(
    State(state): State<AppState>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> Envelope<bool> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.users.validate_username(&query.username))
}

/// The user the bearer token belongs to
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Envelope<User> {
    Json(state.users.retrieve_by_id(auth.user_id).await)
}

/// Deactivate the session of the bearer token
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Envelope<bool> {
    tracing::info!(user_id = auth.user_id, session_id = auth.session_id, "Logout");
    Json(state.sessions.deactivate(auth.session_id).await)
}
