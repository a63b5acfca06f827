//! Repository Implementations
//!
//! Implementations of the domain store traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - `users` table, with paging and search
//! - **PgTokenRepository** - `sessions` and `access_tokens` tables
//! - **InMemoryRepository** - process-local store for any entity, used by the
//!   `memory` storage backend and by tests
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgTokenRepository, PgUserRepository};
//!
//! fn setup_repositories(pool: PgPool) {
//!     let users = PgUserRepository::new(pool.clone());
//!     let sessions = PgTokenRepository::sessions(pool.clone());
//!     let access_tokens = PgTokenRepository::access_tokens(pool);
//! }
//! ```

pub mod memory_repository;
pub mod token_repository;
pub mod user_repository;

pub use memory_repository::{InMemoryRepository, OwnedRows};
pub use token_repository::PgTokenRepository;
pub use user_repository::PgUserRepository;

use crate::shared::error::AppError;

/// Translate a failed write, surfacing unique violations as conflicts.
pub(crate) fn map_write_error(e: sqlx::Error, conflict_message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(conflict_message.to_string())
        }
        _ => AppError::Database(e),
    }
}

/// `ILIKE` pattern matching `text` anywhere, with wildcards escaped.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
