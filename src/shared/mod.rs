//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;
pub mod operation_result;
pub mod validation;

pub use operation_result::{ErrorCategory, Failure, OperationResult};
