//! In-Memory Repository
//!
//! Process-local implementation of the store traits. Rows live in a
//! `BTreeMap` keyed by id, so iteration order is id order like the SQL
//! stores. Natural keys are enforced under the write lock and violations are
//! reported as `AppError::Conflict`, the same way the database reports its
//! unique indexes. Deleting a user also deletes the token rows registered
//! with [`InMemoryRepository::cascade_to`], matching `ON DELETE CASCADE`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Entity, EntityFilter, Store, TokenRecord, User, UserFilter, UserStore};
use crate::shared::error::AppError;

/// Extracts the natural keys of an entity; two rows may not share a key.
type KeyFn<T> = fn(&T) -> Vec<String>;

/// Rows that reference an owner row by id and go away with it.
pub trait OwnedRows: Send + Sync {
    /// Drop every row owned by `owner_id`; answers how many went.
    fn remove_owned_by(&self, owner_id: i64) -> usize;
}

pub struct InMemoryRepository<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
    unique_keys: KeyFn<T>,
    dependents: Vec<Arc<dyn OwnedRows>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new(unique_keys: KeyFn<T>) -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            unique_keys,
            dependents: Vec::new(),
        }
    }

    /// Delete `rows` owned by an entity whenever that entity is deleted.
    pub fn cascade_to(mut self, rows: Arc<dyn OwnedRows>) -> Self {
        self.dependents.push(rows);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn ensure_unique(&self, rows: &BTreeMap<i64, T>, entity: &T) -> Result<(), AppError> {
        let keys = (self.unique_keys)(entity);
        if keys.is_empty() {
            return Ok(());
        }
        let clash = rows
            .values()
            .filter(|row| row.id() != entity.id())
            .any(|row| (self.unique_keys)(row).iter().any(|k| keys.contains(k)));
        if clash {
            return Err(AppError::Conflict(format!(
                "{} with the same key already exists",
                T::TYPE_NAME
            )));
        }
        Ok(())
    }
}

impl InMemoryRepository<User> {
    /// User store keyed by case-insensitive username and email.
    pub fn users() -> Self {
        Self::new(|user| {
            vec![
                format!("username:{}", user.username.to_lowercase()),
                format!("email:{}", user.email.to_lowercase()),
            ]
        })
    }

    fn search(&self, search: Option<&str>) -> Vec<User> {
        let filter = search
            .filter(|s| !s.is_empty())
            .map(|s| UserFilter::Search(s.to_string()));
        self.rows
            .read()
            .values()
            .filter(|user| filter.as_ref().map_or(true, |f| f.matches(user)))
            .cloned()
            .collect()
    }
}

impl<T: TokenRecord> InMemoryRepository<T> {
    /// Token store keyed by the `(user_id, token)` pair.
    pub fn tokens() -> Self {
        Self::new(|record| vec![format!("{}:{}", record.user_id(), record.token())])
    }
}

impl<T: TokenRecord> OwnedRows for InMemoryRepository<T> {
    fn remove_owned_by(&self, owner_id: i64) -> usize {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, record| record.user_id() != owner_id);
        before - rows.len()
    }
}

#[async_trait]
impl<T: Entity> Store<T> for InMemoryRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, AppError> {
        Ok(self.rows.read().values().cloned().collect())
    }

    async fn get_by_filter(&self, filter: &T::Filter) -> Result<Vec<T>, AppError> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn create(&self, mut entity: T) -> Result<i64, AppError> {
        entity.set_id(crate::domain::UNASSIGNED_ID);
        let mut rows = self.rows.write();
        self.ensure_unique(&rows, &entity)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entity.set_id(id);
        rows.insert(id, entity);
        Ok(id)
    }

    async fn update(&self, entity: &T) -> Result<bool, AppError> {
        let mut rows = self.rows.write();
        if !rows.contains_key(&entity.id()) {
            return Ok(false);
        }
        self.ensure_unique(&rows, entity)?;
        rows.insert(entity.id(), entity.clone());
        Ok(true)
    }

    async fn delete(&self, entity: &T) -> Result<bool, AppError> {
        let removed = self.rows.write().remove(&entity.id()).is_some();
        if removed {
            for dependent in &self.dependents {
                dependent.remove_owned_by(entity.id());
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl UserStore for InMemoryRepository<User> {
    async fn get_page(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let offset = usize::try_from(offset)
            .map_err(|_| AppError::BadRequest("offset must not be negative".into()))?;
        let limit = usize::try_from(limit)
            .map_err(|_| AppError::BadRequest("limit must not be negative".into()))?;

        Ok(self
            .search(search)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self, search: Option<&str>) -> Result<i64, AppError> {
        Ok(self.search(search).len() as i64)
    }
}
