//! User Handlers
//!
//! User-specific administrative endpoints. Plain CRUD lives in
//! [`super::entity`].

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};

use super::{rejected, Envelope};
use crate::application::dto::{CountQuery, PageQuery, SetPasswordRequest};
use crate::application::services::UserService;
use crate::domain::User;
use crate::startup::AppState;

/// `GET /users/page?page_number=&page_size=&filter=`
pub async fn get_page(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Envelope<Vec<User>> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection),
    };
    Json(
        state
            .users
            .get_page_by_filter(query.page_number, query.page_size, &query.filter)
            .await,
    )
}

/// `GET /users/count?filter=`
pub async fn get_count(
    State(state): State<AppState>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> Envelope<i64> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection),
    };
    Json(state.users.get_count_by_filter(&query.filter).await)
}

/// `PUT /users/password`
pub async fn set_password(
    State(state): State<AppState>,
    body: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> Envelope<bool> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    Json(
        state
            .users
            .set_new_password(&body.email, &body.new_password)
            .await,
    )
}
