//! Port for the one-time-passcode cache.

use std::time::Duration;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::shared::error::AppError;

/// Short-lived passcode storage keyed by email.
///
/// Only `get` and `set` are offered: a stored code lives until its TTL runs
/// out or it is overwritten by a newer one.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Code currently stored for `email`, if any and not expired.
    async fn get(&self, email: &str) -> Result<Option<String>, AppError>;

    /// Store `code` for `email`, replacing any previous code.
    async fn set(&self, email: &str, code: &str, ttl: Duration) -> Result<(), AppError>;
}
