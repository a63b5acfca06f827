//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL and in-memory)
//! - One-time passcode caches (Redis and in-memory)
//! - External API clients (mail relay, captcha, log collector)
//! - Prometheus metrics

pub mod cache;
pub mod database;
pub mod external;
pub mod metrics;
pub mod repositories;
