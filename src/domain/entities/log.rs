//! Log entry value.
//!
//! One traced operation, shipped to the remote log collector. Immutable once
//! built; the timestamp is taken at construction.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Information,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Information => "Information",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }
}

/// Kind of operation being traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
    Activate,
    Deactivate,
    Login,
    Otp,
    Captcha,
    Email,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Activate => "Activate",
            Self::Deactivate => "Deactivate",
            Self::Login => "Login",
            Self::Otp => "Otp",
            Self::Captcha => "Captcha",
            Self::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Log {
    message: String,
    entity_type: String,
    entity_snapshot: String,
    level: LogLevel,
    operation: OperationKind,
    timestamp: DateTime<Utc>,
}

impl Log {
    pub fn new(
        message: impl Into<String>,
        entity_type: impl Into<String>,
        entity_snapshot: impl Into<String>,
        level: LogLevel,
        operation: OperationKind,
    ) -> Self {
        Self {
            message: message.into(),
            entity_type: entity_type.into(),
            entity_snapshot: entity_snapshot.into(),
            level,
            operation,
            timestamp: Utc::now(),
        }
    }

    /// Entry for a failed operation on `entity`, with a JSON snapshot of it.
    pub fn error_for<T: Serialize>(
        message: impl Into<String>,
        entity_type: &str,
        entity: Option<&T>,
        operation: OperationKind,
    ) -> Self {
        let snapshot = entity
            .and_then(|e| serde_json::to_string(e).ok())
            .unwrap_or_default();
        Self::new(message, entity_type, snapshot, LogLevel::Error, operation)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_snapshot(&self) -> &str {
        &self.entity_snapshot
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
