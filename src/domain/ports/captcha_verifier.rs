//! Port for captcha verification.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::shared::operation_result::OperationResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Check a client-supplied captcha response token with the provider.
    async fn validate(&self, token: &str) -> OperationResult<bool>;
}
