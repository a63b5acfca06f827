//! Port for remote log shipping.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::Log;
use crate::shared::operation_result::OperationResult;

/// Destination for [`Log`] entries.
///
/// Callers treat shipping as fire-and-forget: a failed delivery is reported
/// in the returned envelope but never changes the outcome of the operation
/// being logged.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn create_log(&self, log: &Log) -> OperationResult<bool>;
}
