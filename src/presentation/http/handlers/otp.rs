//! One-Time Passcode Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{rejected, Envelope};
use crate::application::dto::{GenerateOtpRequest, ValidateOtpRequest};
use crate::application::services::OtpService;
use crate::startup::AppState;

/// Generate a passcode and email it
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateOtpRequest>, JsonRejection>,
) -> Envelope<bool> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.otp.generate_otp(&body.email).await)
}

/// Check a passcode without logging in
pub async fn validate(
    State(state): State<AppState>,
    body: Result<Json<ValidateOtpRequest>, JsonRejection>,
) -> Envelope<bool> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.otp.validate_otp(&body.email, &body.otp).await)
}
