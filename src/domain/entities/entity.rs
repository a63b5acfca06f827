//! Entity capability and the generic store contract.
//!
//! Every persisted record has an integer identity and an active flag. The
//! store trait is defined here, next to the capability it is generic over,
//! and implemented in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::error::AppError;

/// Identity value of an entity that has not been persisted yet.
pub const UNASSIGNED_ID: i64 = 0;

/// Capability shared by `User`, `Session` and `AccessToken`.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Typed query understood by the store for this entity.
    type Filter: EntityFilter<Self> + Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Type name used in log entries and metric labels (`"User"`).
    const TYPE_NAME: &'static str;

    /// Lower-case name used in user-facing messages (`"user"`).
    const DISPLAY_NAME: &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Filter selecting exactly the row with this identity.
    fn id_filter(id: i64) -> Self::Filter;

    /// Server-assigned timestamps on creation.
    fn stamp_created(&mut self, _now: DateTime<Utc>) {}

    /// Server-assigned timestamps on modification.
    fn stamp_modified(&mut self, _now: DateTime<Utc>) {}

    /// Copy from the stored row what `modify` never changes: the creation
    /// time and the active flag, which only activate/deactivate touch.
    fn keep_stored(&mut self, stored: &Self);

    fn is_persisted(&self) -> bool {
        self.id() != UNASSIGNED_ID
    }
}

/// In-memory evaluation of a typed filter.
///
/// SQL stores translate filters to `WHERE` clauses; the in-memory store and
/// tests use this instead.
pub trait EntityFilter<T> {
    fn matches(&self, entity: &T) -> bool;
}

/// Generic data-access contract over an [`Entity`].
///
/// Every mutating call is its own atomic unit against the store. Errors are
/// returned as-is; callers decide how to present them.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Every row, ordered by identity.
    async fn get_all(&self) -> Result<Vec<T>, AppError>;

    /// Rows matching `filter`, ordered by identity.
    async fn get_by_filter(&self, filter: &T::Filter) -> Result<Vec<T>, AppError>;

    /// Insert the entity with its identity reset, returning the assigned id.
    async fn create(&self, entity: T) -> Result<i64, AppError>;

    /// Replace every field of the row with the entity's identity.
    /// Returns whether exactly one row was affected.
    async fn update(&self, entity: &T) -> Result<bool, AppError>;

    /// Remove the row with the entity's identity.
    /// Returns whether exactly one row was affected.
    async fn delete(&self, entity: &T) -> Result<bool, AppError>;
}
