//! User Session entity.
//!
//! Maps to the `sessions` table in the database schema.
//! A session row is written for every successful login and holds the bearer
//! token handed to the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityFilter, UNASSIGNED_ID};
use super::token::{TokenFilter, TokenParts, TokenRecord};

/// Represents a login session.
///
/// Maps to the `sessions` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - user_id: BIGINT NOT NULL REFERENCES users(id)
/// - token: VARCHAR(500) NOT NULL, UNIQUE (user_id, token)
/// - expiration: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
/// - active: BOOLEAN NOT NULL DEFAULT TRUE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: i64,

    /// User this session belongs to
    pub user_id: i64,

    /// Bearer token issued at login
    pub token: String,

    /// When this session expires
    pub expiration: DateTime<Utc>,

    /// When the session was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Session {
    /// Create a new, not yet persisted, active session.
    pub fn new(user_id: i64, token: impl Into<String>, expiration: DateTime<Utc>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            user_id,
            token: token.into(),
            expiration,
            created_at: Utc::now(),
            active: true,
        }
    }
}

impl Entity for Session {
    type Filter = TokenFilter;

    const TYPE_NAME: &'static str = "Session";
    const DISPLAY_NAME: &'static str = "session";

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

    fn id_filter(id: i64) -> TokenFilter {
        TokenFilter::Id(id)
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
    }

    fn keep_stored(&mut self, stored: &Self) {
        self.created_at = stored.created_at;
        self.active = stored.active;
    }
}

impl EntityFilter<Session> for TokenFilter {
    fn matches(&self, session: &Session) -> bool {
        self.matches_parts(session.id, session.user_id, &session.token)
    }
}

impl TokenRecord for Session {
    fn user_id(&self) -> i64 {
        self.user_id
    }

    fn token(&self) -> &str {
        &self.token
    }

    fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_parts(&self) -> TokenParts {
        TokenParts {
            id: self.id,
            user_id: self.user_id,
            token: self.token.clone(),
            expiration: self.expiration,
            created_at: self.created_at,
            active: self.active,
        }
    }

    fn from_parts(parts: TokenParts) -> Self {
        Self {
            id: parts.id,
            user_id: parts.user_id,
            token: parts.token,
            expiration: parts.expiration,
            created_at: parts.created_at,
            active: parts.active,
        }
    }
}
