//! User rules: username 6-50 characters, password 6-100, email 10-100 and
//! well formed; username and email unique across active and inactive users.

use std::sync::Arc;

use async_trait::async_trait;

use super::{key_taken, EntityValidator};
use crate::domain::{Store, User, UserFilter};
use crate::shared::operation_result::{Failure, OperationResult};
use crate::shared::validation::RuleSet;

pub const USERNAME_MIN: usize = 6;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 100;
pub const EMAIL_MIN: usize = 10;
pub const EMAIL_MAX: usize = 100;

pub struct UserValidator {
    store: Arc<dyn Store<User>>,
}

impl UserValidator {
    pub fn new(store: Arc<dyn Store<User>>) -> Self {
        Self { store }
    }

    /// Field rules that need no store access.
    pub fn structural_rules(user: &User) -> RuleSet {
        RuleSet::new()
            .required("Username", &user.username)
            .length("Username", &user.username, USERNAME_MIN, USERNAME_MAX)
            .required("Password", &user.password)
            .length("Password", &user.password, PASSWORD_MIN, PASSWORD_MAX)
            .required("Email", &user.email)
            .length("Email", &user.email, EMAIL_MIN, EMAIL_MAX)
            .email("Email", &user.email)
    }

    async fn check(&self, user: &User, existing_id: Option<i64>) -> Result<bool, Failure> {
        Self::structural_rules(user).finish()?;

        let store = self.store.as_ref();
        let username_taken = key_taken(
            store,
            &UserFilter::Username(user.username.clone()),
            existing_id,
        )
        .await?;
        let email_taken =
            key_taken(store, &UserFilter::Email(user.email.clone()), existing_id).await?;

        RuleSet::new()
            .check(!username_taken, "Username is already registered.")
            .check(!email_taken, "Email is already registered.")
            .finish()?;
        Ok(true)
    }
}

#[async_trait]
impl EntityValidator<User> for UserValidator {
    async fn validate_entity(&self, user: &User, existing_id: Option<i64>) -> OperationResult<bool> {
        OperationResult::from_result(self.check(user, existing_id).await, "The user is valid.")
    }
}
