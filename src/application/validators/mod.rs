//! Validation Gate
//!
//! Per-entity rule objects run before any mutation. Structural rules are
//! evaluated together and reported as one message; uniqueness rules query the
//! store and run only once the structural rules pass.

mod token_validator;
mod user_validator;

pub use token_validator::TokenValidator;
pub use user_validator::UserValidator;

use async_trait::async_trait;

use crate::domain::{Entity, Store};
use crate::shared::operation_result::{Failure, OperationResult};

/// Decides whether an entity may be persisted.
///
/// `existing_id` is `None` on create, so any row sharing a natural key is a
/// conflict, and `Some(id)` on modify, so the entity's own row is ignored.
#[async_trait]
pub trait EntityValidator<T: Entity>: Send + Sync {
    async fn validate_entity(&self, entity: &T, existing_id: Option<i64>) -> OperationResult<bool>;
}

/// Rows matching `filter`, with store errors reported as data-layer failures.
pub(crate) async fn matching<T: Entity>(
    store: &dyn Store<T>,
    filter: &T::Filter,
) -> Result<Vec<T>, Failure> {
    store.get_by_filter(filter).await.map_err(|e| {
        Failure::failure_database(format!(
            "Failed to retrieve {} records at the data layer.",
            T::DISPLAY_NAME
        ))
        .with_cause(e)
    })
}

/// Whether any row other than `existing_id` matches `filter`.
pub(crate) async fn key_taken<T: Entity>(
    store: &dyn Store<T>,
    filter: &T::Filter,
    existing_id: Option<i64>,
) -> Result<bool, Failure> {
    let rows = matching(store, filter).await?;
    Ok(rows.iter().any(|row| Some(row.id()) != existing_id))
}
