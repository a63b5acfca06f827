//! Cache Module
//!
//! Redis connection management and the one-time-passcode stores.
//!
//! This module provides:
//! - Redis connection management with automatic reconnection
//! - `RedisOtpStore`, the production `OtpStore` backed by Redis `SETEX`
//! - `InMemoryOtpStore`, a process-local `OtpStore` with the same expiry rules
//!
//! # Example
//!
//! ```rust,ignore
//! use auth_backend::infrastructure::cache::{create_redis_client, RedisOtpStore};
//!
//! let conn = create_redis_client(&settings.redis).await?;
//! let otps = RedisOtpStore::new(conn, &settings.redis.otp_prefix);
//! otps.set("someone@example.com", "042917", Duration::from_secs(300)).await?;
//! ```

mod memory_otp_store;
mod otp_cache;

pub use memory_otp_store::InMemoryOtpStore;
pub use otp_cache::RedisOtpStore;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager handles connection pooling and automatic
/// reconnection when the connection is lost.
///
/// # Errors
/// Returns `redis::RedisError` if the URL is invalid or the first
/// connection cannot be made.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key prefixes.
pub mod keys {
    /// Default prefix for one-time passcodes (e.g., "otp:someone@example.com")
    pub const OTP: &str = "otp:";

    /// Generates a passcode key under `prefix`
    #[inline]
    pub fn otp(prefix: &str, email: &str) -> String {
        format!("{}{}", prefix, email)
    }
}
