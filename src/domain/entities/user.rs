//! User entity and store trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityFilter, Store, UNASSIGNED_ID};
use crate::shared::error::AppError;

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - username: VARCHAR(50) NOT NULL UNIQUE
/// - password: VARCHAR(255) NOT NULL (Argon2 PHC string)
/// - email: VARCHAR(100) NOT NULL UNIQUE
/// - created_at: TIMESTAMPTZ NOT NULL
/// - updated_at: TIMESTAMPTZ NOT NULL
/// - active: BOOLEAN NOT NULL DEFAULT TRUE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identity, `0` until persisted
    #[serde(default)]
    pub id: i64,

    /// Username (6-50 characters, unique)
    pub username: String,

    /// Plaintext on the way in, Argon2 hash once stored
    #[serde(skip_serializing)]
    pub password: String,

    /// Email address (unique)
    pub email: String,

    /// Account creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete flag
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Create a new, not yet persisted, active user.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UNASSIGNED_ID,
            username: username.into(),
            password: password.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
            active: true,
        }
    }
}

impl Entity for User {
    type Filter = UserFilter;

    const TYPE_NAME: &'static str = "User";
    const DISPLAY_NAME: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn id_filter(id: i64) -> UserFilter {
        UserFilter::Id(id)
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn stamp_modified(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn keep_stored(&mut self, stored: &Self) {
        self.created_at = stored.created_at;
        self.active = stored.active;
    }
}

/// Typed queries over users.
///
/// `Username` and `Email` compare case-insensitively; `Search` matches a
/// case-insensitive substring of the username or the email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(i64),
    Username(String),
    Email(String),
    Search(String),
}

impl EntityFilter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        match self {
            Self::Id(id) => user.id == *id,
            Self::Username(username) => user.username.to_lowercase() == username.to_lowercase(),
            Self::Email(email) => user.email.to_lowercase() == email.to_lowercase(),
            Self::Search(text) => {
                let needle = text.to_lowercase();
                user.username.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            }
        }
    }
}

/// User-specific queries on top of the generic store.
#[async_trait]
pub trait UserStore: Store<User> {
    /// One page of users ordered by id, optionally narrowed by a search text.
    async fn get_page(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, AppError>;

    /// Number of users the same search would return.
    async fn count(&self, search: Option<&str>) -> Result<i64, AppError>;
}
