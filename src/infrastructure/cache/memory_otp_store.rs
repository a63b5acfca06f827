//! Process-local passcode store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::OtpStore;
use crate::shared::error::AppError;

#[derive(Debug, Clone)]
struct Entry {
    code: String,
    expires_at: Instant,
}

/// `OtpStore` over a `DashMap`. Expired entries are dropped when read and
/// swept on every write.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn get(&self, email: &str) -> Result<Option<String>, AppError> {
        let now = Instant::now();
        let code = match self.entries.get(email) {
            Some(entry) if entry.expires_at > now => Some(entry.code.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if code.is_none() {
            self.entries.remove_if(email, |_, entry| entry.expires_at <= now);
        }
        Ok(code)
    }

    async fn set(&self, email: &str, code: &str, ttl: Duration) -> Result<(), AppError> {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.entries.insert(
            email.to_string(),
            Entry {
                code: code.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
