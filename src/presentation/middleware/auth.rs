//! Authentication Middleware
//!
//! Bearer token validation for the administrative routes. A token is
//! accepted only while its session row is active and unexpired and its user
//! exists and is active, so deactivating either the session or the user
//! revokes the token.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::application::services::EntityOperations;
use crate::domain::{Entity, TokenFilter, TokenRecord};
use crate::shared::error::AppError;
use crate::shared::operation_result::ErrorCategory;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    /// Session the bearer token belongs to
    pub session_id: i64,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    // Check for Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    // Decode and validate JWT
    let claims = state
        .tokens
        .decode(token)
        .map_err(|failure| AppError::Unauthorized(failure.message().to_string()))?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid token claims".into()))?;

    // The session must still be live
    let sessions = state
        .sessions
        .retrieve_by_filter(&TokenFilter::UserToken {
            user_id,
            token: token.to_string(),
        })
        .await
        .into_result()
        .map_err(|failure| AppError::Internal(failure.to_string()))?;
    let now = Utc::now();
    let session = sessions
        .into_iter()
        .find(|session| session.is_valid_at(now))
        .ok_or_else(|| AppError::Unauthorized("Session is no longer active".into()))?;

    // So must the account
    let user = match state.user_entities.retrieve_by_id(user_id).await.into_result() {
        Ok(user) => user,
        Err(failure) if failure.category() == ErrorCategory::NotFound => {
            return Err(AppError::Unauthorized("User account no longer exists".into()));
        }
        Err(failure) => return Err(AppError::Internal(failure.to_string())),
    };
    if !user.active {
        return Err(AppError::Unauthorized("User account is deactivated".into()));
    }

    // Insert authenticated user into request extensions
    request.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
        session_id: session.id(),
    });

    // Continue to the next handler
    Ok(next.run(request).await)
}
