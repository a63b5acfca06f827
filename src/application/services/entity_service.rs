//! Entity Repository Service
//!
//! Generic add / modify / remove / activate / deactivate / retrieve over any
//! [`Entity`], composed from a [`Store`] and an [`EntityValidator`]. Every
//! operation answers with an [`OperationResult`]; store errors are converted
//! here, keep the original error as the failure's cause, and are shipped to
//! the [`LogSink`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::application::validators::EntityValidator;
use crate::domain::{Entity, Log, LogSink, OperationKind, Store, UNASSIGNED_ID};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::operation_result::{Failure, OperationResult};

pub const MISSING_DATA: &str = "The necessary data was not provided.";

/// Use-case interface shared by every administered entity.
#[async_trait]
pub trait EntityOperations<T: Entity>: Send + Sync {
    /// Validate and insert; answers with the assigned id.
    async fn add(&self, entity: Option<T>) -> OperationResult<i64>;

    /// Validate and replace the row with the entity's id.
    async fn modify(&self, entity: Option<T>) -> OperationResult<bool>;

    async fn remove(&self, id: i64) -> OperationResult<bool>;

    async fn activate(&self, id: i64) -> OperationResult<bool>;

    /// Clears the active flag; repeating it on an inactive row succeeds.
    async fn deactivate(&self, id: i64) -> OperationResult<bool>;

    async fn retrieve_all(&self) -> OperationResult<Vec<T>>;

    async fn retrieve_by_id(&self, id: i64) -> OperationResult<T>;

    async fn retrieve_by_filter(&self, filter: &T::Filter) -> OperationResult<Vec<T>>;
}

/// "access token" -> "Access token"
fn title<T: Entity>() -> String {
    let mut chars = T::DISPLAY_NAME.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn not_found<T: Entity>() -> Failure {
    Failure::failure_not_found(format!("The {} does not exist.", T::DISPLAY_NAME))
}

/// Send a log entry on a detached task, tracing rather than failing when
/// shipping fails. The caller never waits on the collector.
pub(crate) fn ship_log(log_sink: Arc<dyn LogSink>, log: Log) -> JoinHandle<()> {
    tokio::spawn(async move {
        let shipped = log_sink.create_log(&log).await;
        if !shipped.is_successful() {
            warn!(
                message = shipped.message(),
                category = %shipped.error_category(),
                "Failed to ship log entry"
            );
        }
    })
}

pub struct EntityService<T: Entity> {
    store: Arc<dyn Store<T>>,
    validator: Arc<dyn EntityValidator<T>>,
    log_sink: Arc<dyn LogSink>,
}

impl<T: Entity> EntityService<T> {
    pub fn new(
        store: Arc<dyn Store<T>>,
        validator: Arc<dyn EntityValidator<T>>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            store,
            validator,
            log_sink,
        }
    }

    /// `add` with a transformation applied after validation and before the
    /// insert (used to hash passwords).
    pub async fn add_prepared<F>(&self, entity: Option<T>, prepare: F) -> OperationResult<i64>
    where
        F: FnOnce(T) -> Result<T, Failure> + Send,
    {
        let result = self.try_add(entity, prepare).await;
        self.finish(OperationKind::Create, result, || {
            format!("{} added successfully.", title::<T>())
        })
    }

    /// `modify` with a transformation applied after validation and before
    /// the update.
    pub async fn modify_prepared<F>(&self, entity: Option<T>, prepare: F) -> OperationResult<bool>
    where
        F: FnOnce(T) -> Result<T, Failure> + Send,
    {
        let result = self.try_modify(entity, prepare).await;
        self.finish(OperationKind::Update, result, || {
            format!("{} modified successfully.", title::<T>())
        })
    }

    async fn try_add<F>(&self, entity: Option<T>, prepare: F) -> Result<i64, Failure>
    where
        F: FnOnce(T) -> Result<T, Failure> + Send,
    {
        let mut entity = entity.ok_or_else(|| Failure::failure_business_validation(MISSING_DATA))?;
        entity.set_id(UNASSIGNED_ID);
        entity.stamp_created(Utc::now());

        self.validator
            .validate_entity(&entity, None)
            .await
            .into_result()?;
        let entity = prepare(entity)?;

        match self.store.create(entity.clone()).await {
            Ok(id) => Ok(id),
            Err(e) => Err(self.store_failure(e, OperationKind::Create, Some(&entity))),
        }
    }

    async fn try_modify<F>(&self, entity: Option<T>, prepare: F) -> Result<bool, Failure>
    where
        F: FnOnce(T) -> Result<T, Failure> + Send,
    {
        let mut entity = entity.ok_or_else(|| Failure::failure_business_validation(MISSING_DATA))?;
        if !entity.is_persisted() {
            return Err(Failure::failure_business_validation(MISSING_DATA));
        }
        let stored = self.find(entity.id(), OperationKind::Update).await?;
        entity.keep_stored(&stored);
        entity.stamp_modified(Utc::now());

        self.validator
            .validate_entity(&entity, Some(entity.id()))
            .await
            .into_result()?;
        let entity = prepare(entity)?;

        match self.store.update(&entity).await {
            Ok(true) => Ok(true),
            Ok(false) => Err(not_found::<T>()),
            Err(e) => Err(self.store_failure(e, OperationKind::Update, Some(&entity))),
        }
    }

    async fn find(&self, id: i64, operation: OperationKind) -> Result<T, Failure> {
        if id == UNASSIGNED_ID {
            return Err(Failure::failure_business_validation(MISSING_DATA));
        }
        match self.store.get_by_filter(&T::id_filter(id)).await {
            Ok(rows) => rows.into_iter().next().ok_or_else(not_found::<T>),
            Err(e) => Err(self.store_failure(e, operation, None)),
        }
    }

    async fn try_remove(&self, id: i64) -> Result<bool, Failure> {
        let entity = self.find(id, OperationKind::Delete).await?;
        match self.store.delete(&entity).await {
            Ok(true) => Ok(true),
            Ok(false) => Err(not_found::<T>()),
            Err(e) => Err(self.store_failure(e, OperationKind::Delete, Some(&entity))),
        }
    }

    async fn try_set_active(&self, id: i64, active: bool) -> Result<bool, Failure> {
        let operation = if active {
            OperationKind::Activate
        } else {
            OperationKind::Deactivate
        };
        let mut entity = self.find(id, operation).await?;
        entity.set_active(active);
        entity.stamp_modified(Utc::now());

        match self.store.update(&entity).await {
            Ok(true) => Ok(true),
            Ok(false) => Err(not_found::<T>()),
            Err(e) => Err(self.store_failure(e, operation, Some(&entity))),
        }
    }

    async fn try_retrieve(&self, filter: Option<&T::Filter>) -> Result<Vec<T>, Failure> {
        let rows = match filter {
            Some(filter) => self.store.get_by_filter(filter).await,
            None => self.store.get_all().await,
        };
        match rows {
            Ok(rows) => Ok(rows),
            Err(e) => Err(self.store_failure(e, OperationKind::Read, None)),
        }
    }

    /// Convert a store error into the failure callers see.
    ///
    /// A unique-key conflict reported by the store is a validation outcome;
    /// anything else is a data-layer failure, traced and shipped as a log
    /// entry with a snapshot of the entity.
    pub(crate) fn store_failure(
        &self,
        e: AppError,
        operation: OperationKind,
        entity: Option<&T>,
    ) -> Failure {
        if let AppError::Conflict(detail) = &e {
            debug!(entity = T::TYPE_NAME, detail = %detail, "Store rejected duplicate key");
            return Failure::failure_business_validation(format!(
                "The {} is already registered.",
                T::DISPLAY_NAME
            ))
            .with_cause(e);
        }

        let verb = match operation {
            OperationKind::Read => "retrieve",
            OperationKind::Create => "add",
            OperationKind::Delete => "remove",
            _ => "update",
        };
        let message = format!(
            "Failed to {} {} records at the data layer.",
            verb,
            T::DISPLAY_NAME
        );
        error!(
            entity = T::TYPE_NAME,
            operation = operation.as_str(),
            error = %e,
            "{}",
            message
        );
        ship_log(
            self.log_sink.clone(),
            Log::error_for(&message, T::TYPE_NAME, entity, operation),
        );

        Failure::failure_database(message).with_cause(e)
    }

    fn finish<R>(
        &self,
        operation: OperationKind,
        result: Result<R, Failure>,
        message: impl FnOnce() -> String,
    ) -> OperationResult<R> {
        let outcome = match &result {
            Ok(_) => "success",
            Err(failure) => failure.category().as_str(),
        };
        metrics::record_repository_operation(T::TYPE_NAME, operation.as_str(), outcome);

        match result {
            Ok(data) => OperationResult::success(data, message()),
            Err(failure) => failure.into(),
        }
    }
}

#[async_trait]
impl<T: Entity> EntityOperations<T> for EntityService<T> {
    async fn add(&self, entity: Option<T>) -> OperationResult<i64> {
        self.add_prepared(entity, Ok).await
    }

    async fn modify(&self, entity: Option<T>) -> OperationResult<bool> {
        self.modify_prepared(entity, Ok).await
    }

    async fn remove(&self, id: i64) -> OperationResult<bool> {
        let result = self.try_remove(id).await;
        self.finish(OperationKind::Delete, result, || {
            format!("{} removed successfully.", title::<T>())
        })
    }

    async fn activate(&self, id: i64) -> OperationResult<bool> {
        let result = self.try_set_active(id, true).await;
        self.finish(OperationKind::Activate, result, || {
            format!("{} activated successfully.", title::<T>())
        })
    }

    async fn deactivate(&self, id: i64) -> OperationResult<bool> {
        let result = self.try_set_active(id, false).await;
        self.finish(OperationKind::Deactivate, result, || {
            format!("{} deactivated successfully.", title::<T>())
        })
    }

    async fn retrieve_all(&self) -> OperationResult<Vec<T>> {
        let result = self.try_retrieve(None).await;
        self.finish(OperationKind::Read, result, || {
            format!("{} records retrieved successfully.", title::<T>())
        })
    }

    async fn retrieve_by_id(&self, id: i64) -> OperationResult<T> {
        let result = self.find(id, OperationKind::Read).await;
        self.finish(OperationKind::Read, result, || {
            format!("{} retrieved successfully.", title::<T>())
        })
    }

    async fn retrieve_by_filter(&self, filter: &T::Filter) -> OperationResult<Vec<T>> {
        let result = self.try_retrieve(Some(filter)).await;
        self.finish(OperationKind::Read, result, || {
            format!("{} records retrieved successfully.", title::<T>())
        })
    }
}
