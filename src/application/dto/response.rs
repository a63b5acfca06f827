//! Response DTOs
//!
//! Data structures for API response payloads. Entities are returned as-is
//! (the user password never serializes); only login has its own shape.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Successful login payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub token_type: String,
    pub expiration: DateTime<Utc>,
}
