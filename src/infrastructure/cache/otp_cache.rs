//! Redis-backed passcode store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::instrument;

use super::keys;
use crate::domain::OtpStore;
use crate::shared::error::AppError;

/// Passcodes stored with `SETEX`, so Redis expires them on its own.
#[derive(Clone)]
pub struct RedisOtpStore {
    redis: ConnectionManager,
    prefix: String,
}

impl RedisOtpStore {
    pub fn new(redis: ConnectionManager, prefix: &str) -> Self {
        Self {
            redis,
            prefix: prefix.to_string(),
        }
    }

    /// Round-trip check used by the readiness probe.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.redis.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    #[instrument(skip(self))]
    async fn get(&self, email: &str) -> Result<Option<String>, AppError> {
        let key = keys::otp(&self.prefix, email);
        let mut conn = self.redis.clone();
        let code: Option<String> = conn.get(&key).await?;
        Ok(code)
    }

    #[instrument(skip(self, code))]
    async fn set(&self, email: &str, code: &str, ttl: Duration) -> Result<(), AppError> {
        let key = keys::otp(&self.prefix, email);
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, code, seconds).await?;
        Ok(())
    }
}
