//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Business endpoints always answer
//! `200 OK` with an [`OperationResult`] body; a body, path or query that
//! cannot be read becomes a `DataSubmittedInvalid` envelope.

pub mod auth;
pub mod entity;
pub mod health;
pub mod otp;
pub mod user;

use std::fmt::Display;

use axum::Json;
use tracing::debug;

use crate::shared::operation_result::OperationResult;

/// Response body of every business endpoint
pub type Envelope<T> = Json<OperationResult<T>>;

/// Envelope answering a request whose input could not be extracted.
pub(crate) fn rejected<T>(rejection: impl Display) -> Envelope<T> {
    debug!(reason = %rejection, "Rejected request input");
    Json(OperationResult::failure_data_submitted_invalid(format!(
        "The submitted data could not be read: {}",
        rejection
    )))
}
