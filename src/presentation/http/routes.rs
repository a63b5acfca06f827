//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers::{self, entity, entity::Administered};
use crate::domain::{AccessToken, Session, TokenFilter, User};
use crate::infrastructure::metrics;
use crate::presentation::middleware::auth_middleware;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let metrics = metrics::gather_metrics().map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    ))
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes(state.clone()))
        .nest("/otp", otp_routes())
        // Protected routes (require authentication)
        .nest("/users", user_routes(state.clone()))
        .nest("/sessions", token_routes::<Session>(state.clone()))
        .nest("/access-tokens", token_routes::<AccessToken>(state))
}

/// Authentication routes; only `/me` and `/logout` need a token
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/login/otp", post(handlers::auth::login_otp))
        .route("/register", post(handlers::auth::register))
        .route("/password/reset", post(handlers::auth::reset_password))
        .route("/validate/email", get(handlers::auth::validate_email))
        .route("/validate/username", get(handlers::auth::validate_username))
        .merge(protected)
}

/// Passcode routes (public)
fn otp_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::otp::generate))
        .route("/validate", post(handlers::otp::validate))
}

/// CRUD and activation routes for one entity type
fn entity_routes<T: Administered>() -> Router<AppState> {
    Router::new()
        .route("/", get(entity::retrieve_all::<T>).post(entity::add::<T>))
        .route(
            "/{id}",
            get(entity::retrieve_by_id::<T>)
                .put(entity::modify::<T>)
                .delete(entity::remove::<T>),
        )
        .route("/{id}/activate", post(entity::activate::<T>))
        .route("/{id}/deactivate", post(entity::deactivate::<T>))
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    entity_routes::<User>()
        .route("/page", get(handlers::user::get_page))
        .route("/count", get(handlers::user::get_count))
        .route("/password", put(handlers::user::set_password))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Session and access token routes (protected)
fn token_routes<T>(state: AppState) -> Router<AppState>
where
    T: Administered<Filter = TokenFilter>,
{
    entity_routes::<T>()
        .route("/user/{user_id}", get(entity::retrieve_by_user::<T>))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
