//! User Repository Implementation
//!
//! PostgreSQL implementation of the `Store<User>` and `UserStore` traits.
//! Maps between the database schema and the domain User entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{like_pattern, map_write_error};
use crate::domain::{Store, User, UserFilter, UserStore};
use crate::shared::error::AppError;

const USER_COLUMNS: &str = "id, username, password, email, created_at, updated_at, active";

/// Database row representation of the users table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    active: bool,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
            active: self.active,
        }
    }
}

/// PostgreSQL user repository implementation.
///
/// Username and email comparisons are case-insensitive, matching the
/// `LOWER(...)` unique indexes in the schema.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!("SELECT {} FROM users", USER_COLUMNS))
    }

    fn push_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
        if let Some(text) = search.filter(|s| !s.is_empty()) {
            let pattern = like_pattern(text);
            builder
                .push(" WHERE username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern);
        }
    }
}

#[async_trait]
impl Store<User> for PgUserRepository {
    async fn get_all(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn get_by_filter(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        let mut builder = Self::select();
        match filter {
            UserFilter::Id(id) => {
                builder.push(" WHERE id = ").push_bind(*id);
            }
            UserFilter::Username(username) => {
                builder
                    .push(" WHERE LOWER(username) = LOWER(")
                    .push_bind(username.clone())
                    .push(")");
            }
            UserFilter::Email(email) => {
                builder
                    .push(" WHERE LOWER(email) = LOWER(")
                    .push_bind(email.clone())
                    .push(")");
            }
            UserFilter::Search(text) => Self::push_search(&mut builder, Some(text.as_str())),
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn create(&self, user: User) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password, email, created_at, updated_at, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "User with this email or username already exists"))?;

        Ok(id)
    }

    async fn update(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2,
                password = $3,
                email = $4,
                created_at = $5,
                updated_at = $6,
                active = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "User with this email or username already exists"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn get_page(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let mut builder = Self::select();
        Self::push_search(&mut builder, search);
        builder
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn count(&self, search: Option<&str>) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        Self::push_search(&mut builder, search);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
