//! Entity Handlers
//!
//! CRUD and activation endpoints shared by users, sessions and access
//! tokens. Each handler is generic over the entity and routed once per type.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Json,
};
use serde::de::DeserializeOwned;

use super::{rejected, Envelope};
use crate::application::services::EntityOperations;
use crate::domain::{AccessToken, Entity, Session, TokenFilter, User};
use crate::startup::AppState;

/// An entity with administrative endpoints.
pub trait Administered: Entity + DeserializeOwned {
    fn operations(state: &AppState) -> &dyn EntityOperations<Self>;
}

impl Administered for User {
    fn operations(state: &AppState) -> &dyn EntityOperations<Self> {
        state.user_entities.as_ref()
    }
}

impl Administered for Session {
    fn operations(state: &AppState) -> &dyn EntityOperations<Self> {
        state.sessions.as_ref()
    }
}

impl Administered for AccessToken {
    fn operations(state: &AppState) -> &dyn EntityOperations<Self> {
        state.access_tokens.as_ref()
    }
}

/// `GET /`
pub async fn retrieve_all<T: Administered>(State(state): State<AppState>) -> Envelope<Vec<T>> {
    Json(T::operations(&state).retrieve_all().await)
}

/// `GET /{id}`
pub async fn retrieve_by_id<T: Administered>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Envelope<T> {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejected(rejection),
    };
    Json(T::operations(&state).retrieve_by_id(id).await)
}

/// `POST /` with the entity, or `null`, as body
pub async fn add<T: Administered>(
    State(state): State<AppState>,
    body: Result<Json<Option<T>>, JsonRejection>,
) -> Envelope<i64> {
    let Json(entity) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(T::operations(&state).add(entity).await)
}

/// `PUT /{id}`; the path id replaces any id in the body
pub async fn modify<T: Administered>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Option<T>>, JsonRejection>,
) -> Envelope<bool> {
    let (Path(id), Json(entity)) = match (id, body) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(rejection), _) => return rejected(rejection),
        (_, Err(rejection)) => return rejected(rejection),
    };
    let entity = entity.map(|mut entity| {
        entity.set_id(id);
        entity
    });
    Json(T::operations(&state).modify(entity).await)
}

/// `DELETE /{id}`
pub async fn remove<T: Administered>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Envelope<bool> {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejected(rejection),
    };
    Json(T::operations(&state).remove(id).await)
}

/// `POST /{id}/activate`
pub async fn activate<T: Administered>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Envelope<bool> {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejected(rejection),
    };
    Json(T::operations(&state).activate(id).await)
}

/// `POST /{id}/deactivate`
pub async fn deactivate<T: Administered>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Envelope<bool> {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejected(rejection),
    };
    Json(T::operations(&state).deactivate(id).await)
}

/// `GET /user/{user_id}` for sessions and access tokens
pub async fn retrieve_by_user<T>(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Envelope<Vec<T>>
where
    T: Administered<Filter = TokenFilter>,
{
    let Path(user_id) = match user_id {
        Ok(user_id) => user_id,
        Err(rejection) => return rejected(rejection),
    };
    Json(
        T::operations(&state)
            .retrieve_by_filter(&TokenFilter::UserId(user_id))
            .await,
    )
}
