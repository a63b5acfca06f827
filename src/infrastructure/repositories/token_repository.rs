//! Token Repository Implementation
//!
//! PostgreSQL implementation of `Store<T>` for the token tables. `sessions`
//! and `access_tokens` share their columns, so one generic repository serves
//! both; the table name is fixed at construction.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_write_error;
use crate::domain::{AccessToken, Session, Store, TokenFilter, TokenParts, TokenRecord};
use crate::shared::error::AppError;

const TOKEN_COLUMNS: &str = "id, user_id, token, expiration, created_at, active";

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    id: i64,
    user_id: i64,
    token: String,
    expiration: DateTime<Utc>,
    created_at: DateTime<Utc>,
    active: bool,
}

impl TokenRow {
    fn into_entity<T: TokenRecord>(self) -> T {
        T::from_parts(TokenParts {
            id: self.id,
            user_id: self.user_id,
            token: self.token,
            expiration: self.expiration,
            created_at: self.created_at,
            active: self.active,
        })
    }
}

/// PostgreSQL repository for one token table.
pub struct PgTokenRepository<T> {
    pool: PgPool,
    table: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for PgTokenRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table,
            _entity: PhantomData,
        }
    }
}

impl<T: TokenRecord> PgTokenRepository<T> {
    fn with_table(pool: PgPool, table: &'static str) -> Self {
        Self {
            pool,
            table,
            _entity: PhantomData,
        }
    }

    fn conflict_message(&self) -> String {
        format!("{} already exists for this user", T::TYPE_NAME)
    }
}

impl PgTokenRepository<Session> {
    pub fn sessions(pool: PgPool) -> Self {
        Self::with_table(pool, "sessions")
    }
}

impl PgTokenRepository<AccessToken> {
    pub fn access_tokens(pool: PgPool) -> Self {
        Self::with_table(pool, "access_tokens")
    }
}

#[async_trait]
impl<T: TokenRecord> Store<T> for PgTokenRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, AppError> {
        let rows = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM {} ORDER BY id",
            TOKEN_COLUMNS, self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TokenRow::into_entity).collect())
    }

    async fn get_by_filter(&self, filter: &TokenFilter) -> Result<Vec<T>, AppError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM {}", TOKEN_COLUMNS, self.table));
        match filter {
            TokenFilter::Id(id) => {
                builder.push(" WHERE id = ").push_bind(*id);
            }
            TokenFilter::UserId(user_id) => {
                builder.push(" WHERE user_id = ").push_bind(*user_id);
            }
            TokenFilter::UserToken { user_id, token } => {
                builder
                    .push(" WHERE user_id = ")
                    .push_bind(*user_id)
                    .push(" AND token = ")
                    .push_bind(token.clone());
            }
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<TokenRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(TokenRow::into_entity).collect())
    }

    async fn create(&self, entity: T) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(&format!(
            "INSERT INTO {} (user_id, token, expiration, created_at, active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
            self.table
        ))
        .bind(entity.user_id())
        .bind(entity.token())
        .bind(entity.expiration())
        .bind(entity.created_at())
        .bind(entity.is_active())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &self.conflict_message()))?;

        Ok(id)
    }

    async fn update(&self, entity: &T) -> Result<bool, AppError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET user_id = $2, token = $3, expiration = $4, created_at = $5, active = $6 \
             WHERE id = $1",
            self.table
        ))
        .bind(entity.id())
        .bind(entity.user_id())
        .bind(entity.token())
        .bind(entity.expiration())
        .bind(entity.created_at())
        .bind(entity.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &self.conflict_message()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, entity: &T) -> Result<bool, AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(entity.id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
