//! Port for outbound email.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::shared::operation_result::OperationResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a plain-text message to `to`.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> OperationResult<bool>;
}
