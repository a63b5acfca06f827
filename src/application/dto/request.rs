//! Request DTOs
//!
//! Data structures for API request bodies and query strings. Missing fields
//! deserialize as empty so the services, not the extractor, report them.

use serde::Deserialize;

/// Password login request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Passcode login request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpLoginRequest {
    pub email: String,
    pub otp: String,
}

/// Request for a new passcode
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateOtpRequest {
    pub email: String,
}

/// Passcode check without logging in
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidateOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Public registration request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub captcha_token: String,
}

/// Password reset, authorised by a passcode sent to the email
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordResetRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsernameQuery {
    pub username: String,
}

/// Zero-based page of users, optionally narrowed by a search text
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page_number: i64,
    pub page_size: i64,
    pub filter: String,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: 10,
            filter: String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountQuery {
    pub filter: String,
}

/// Administrative password change, no passcode involved
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetPasswordRequest {
    pub email: String,
    pub new_password: String,
}
