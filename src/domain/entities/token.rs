//! Shared shape of issued tokens.
//!
//! `Session` and `AccessToken` are distinct tables with identical columns;
//! this module holds what they have in common so the validator and the SQL
//! store are written once.

use chrono::{DateTime, Utc};

use super::entity::Entity;

/// Typed queries over token rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenFilter {
    Id(i64),
    UserId(i64),
    UserToken { user_id: i64, token: String },
}

impl TokenFilter {
    pub(crate) fn matches_parts(&self, id: i64, user_id: i64, token: &str) -> bool {
        match self {
            Self::Id(wanted) => id == *wanted,
            Self::UserId(wanted) => user_id == *wanted,
            Self::UserToken {
                user_id: wanted_user,
                token: wanted_token,
            } => user_id == *wanted_user && token == wanted_token,
        }
    }
}

/// Column values of a token row, used to move between rows and entities.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenParts {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expiration: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// An entity stored as a token row.
pub trait TokenRecord: Entity<Filter = TokenFilter> {
    fn user_id(&self) -> i64;

    fn token(&self) -> &str;

    fn expiration(&self) -> DateTime<Utc>;

    fn created_at(&self) -> DateTime<Utc>;

    fn to_parts(&self) -> TokenParts;

    fn from_parts(parts: TokenParts) -> Self;

    /// Whether the token is active and not yet expired.
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.expiration() > now
    }
}
