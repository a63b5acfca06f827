//! Operation Result Envelope
//!
//! Uniform success/failure wrapper returned by every service operation.
//! The HTTP layer serializes it as-is, so callers learn about failures from
//! `is_successful` and `error_category` rather than from status codes.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Closed set of failure categories carried on every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    BusinessValidation,
    Database,
    ExternalService,
    Unexpected,
    DataSubmittedInvalid,
    ConfigurationMissing,
    Network,
    UserInput,
    NotFound,
    Authentication,
    Authorization,
    Resource,
    Timeout,
    None,
}

impl ErrorCategory {
    /// Name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessValidation => "BusinessValidation",
            Self::Database => "Database",
            Self::ExternalService => "ExternalService",
            Self::Unexpected => "Unexpected",
            Self::DataSubmittedInvalid => "DataSubmittedInvalid",
            Self::ConfigurationMissing => "ConfigurationMissing",
            Self::Network => "Network",
            Self::UserInput => "UserInput",
            Self::NotFound => "NotFound",
            Self::Authentication => "Authentication",
            Self::Authorization => "Authorization",
            Self::Resource => "Resource",
            Self::Timeout => "Timeout",
            Self::None => "None",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The failure half of an envelope.
///
/// Services build one of these with `?` and convert it into an
/// [`OperationResult`] at their public boundary.
#[derive(Debug, Clone)]
pub struct Failure {
    category: ErrorCategory,
    message: String,
    cause: Option<Cause>,
}

macro_rules! failure_constructors {
    ($($name:ident => $category:ident),* $(,)?) => {
        impl Failure {
            $(
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCategory::$category, message)
                }
            )*
        }

        impl<T> OperationResult<T> {
            $(
                pub fn $name(message: impl Into<String>) -> Self {
                    Failure::$name(message).into()
                }
            )*
        }
    };
}

failure_constructors! {
    failure_business_validation => BusinessValidation,
    failure_database => Database,
    failure_external_service => ExternalService,
    failure_unexpected => Unexpected,
    failure_data_submitted_invalid => DataSubmittedInvalid,
    failure_configuration_missing => ConfigurationMissing,
    failure_network => Network,
    failure_user_input => UserInput,
    failure_not_found => NotFound,
    failure_authentication => Authentication,
    failure_authorization => Authorization,
    failure_resource => Resource,
    failure_timeout => Timeout,
}

impl Failure {
    fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        // A failure must never claim the "no error" category.
        let category = match category {
            ErrorCategory::None => ErrorCategory::Unexpected,
            other => other,
        };
        Self {
            category,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying error that produced this failure.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Tagged outcome of a service operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult<T> {
    is_successful: bool,
    data: Option<T>,
    message: String,
    error_category: ErrorCategory,
    #[serde(skip_serializing)]
    cause: Option<Cause>,
}

impl<T> OperationResult<T> {
    /// Successful outcome carrying `data`.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            is_successful: true,
            data: Some(data),
            message: message.into(),
            error_category: ErrorCategory::None,
            cause: None,
        }
    }

    /// Build an envelope from an internal `Result`, using `message` on success.
    pub fn from_result(result: Result<T, Failure>, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::success(data, message),
            Err(failure) => failure.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.is_successful
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_category(&self) -> ErrorCategory {
        self.error_category
    }

    /// Inner cause kept for diagnostics; never serialized.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Transform the payload of a successful outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            is_successful: self.is_successful,
            data: self.data.map(f),
            message: self.message,
            error_category: self.error_category,
            cause: self.cause,
        }
    }

    /// Split into the internal `Result` form so callers can use `?`.
    pub fn into_result(self) -> Result<T, Failure> {
        match (self.is_successful, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(Failure::failure_unexpected(
                "A successful operation returned no data",
            )),
            (false, _) => Err(Failure {
                category: self.error_category,
                message: self.message,
                cause: self.cause,
            }),
        }
    }
}

impl<T> From<Failure> for OperationResult<T> {
    fn from(failure: Failure) -> Self {
        Self {
            is_successful: false,
            data: None,
            message: failure.message,
            error_category: failure.category,
            cause: failure.cause,
        }
    }
}
