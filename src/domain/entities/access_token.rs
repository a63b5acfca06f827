//! Access token entity.
//!
//! Maps to the `access_tokens` table. Same columns as `sessions`; access
//! tokens are administered directly rather than issued at login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityFilter, UNASSIGNED_ID};
use super::token::{TokenFilter, TokenParts, TokenRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(default)]
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expiration: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AccessToken {
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

impl Entity for AccessToken {
    type Filter = TokenFilter;

    const TYPE_NAME: &'static str = "AccessToken";
    const DISPLAY_NAME: &'static str = "access token";

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

impl EntityFilter<AccessToken> for TokenFilter {
    fn matches(&self, token: &AccessToken) -> bool {
        self.matches_parts(token.id, token.user_id, &token.token)
    }
}

impl TokenRecord for AccessToken {
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
