//! Token rules shared by sessions and access tokens.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use super::{key_taken, matching, EntityValidator};
use crate::domain::{Store, TokenFilter, TokenRecord, User, UserFilter};
use crate::shared::operation_result::{Failure, OperationResult};
use crate::shared::validation::RuleSet;

pub const TOKEN_MAX: usize = 500;

/// Requires a user id, a token of at most 500 characters and an expiration
/// after creation; the user must exist and `(user_id, token)` must be unique.
pub struct TokenValidator<T: TokenRecord> {
    store: Arc<dyn Store<T>>,
    users: Arc<dyn Store<User>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TokenRecord> TokenValidator<T> {
    pub fn new(store: Arc<dyn Store<T>>, users: Arc<dyn Store<User>>) -> Self {
        Self {
            store,
            users,
            _entity: PhantomData,
        }
    }

    pub fn structural_rules(record: &T) -> RuleSet {
        RuleSet::new()
            .check(record.user_id() > 0, "User id is required.")
            .required("Token", record.token())
            .length("Token", record.token(), 1, TOKEN_MAX)
            .check(
                record.expiration() > record.created_at(),
                "Expiration must be later than the creation time.",
            )
    }

    async fn check(&self, record: &T, existing_id: Option<i64>) -> Result<bool, Failure> {
        Self::structural_rules(record).finish()?;

        let owner = matching(self.users.as_ref(), &UserFilter::Id(record.user_id())).await?;
        if owner.is_empty() {
            return Err(Failure::failure_business_validation(
                "The user does not exist.",
            ));
        }

        let filter = TokenFilter::UserToken {
            user_id: record.user_id(),
            token: record.token().to_string(),
        };
        if key_taken(self.store.as_ref(), &filter, existing_id).await? {
            return Err(Failure::failure_business_validation(format!(
                "The {} is already registered.",
                T::DISPLAY_NAME
            )));
        }
        Ok(true)
    }
}

#[async_trait]
impl<T: TokenRecord> EntityValidator<T> for TokenValidator<T> {
    async fn validate_entity(&self, record: &T, existing_id: Option<i64>) -> OperationResult<bool> {
        OperationResult::from_result(
            self.check(record, existing_id).await,
            format!("The {} is valid.", T::DISPLAY_NAME),
        )
    }
}
