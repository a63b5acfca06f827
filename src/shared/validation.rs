//! Validation Utilities
//!
//! A small declarative rule list: each rule contributes zero or one message,
//! every rule is evaluated, and the messages are joined into one failure.

use validator::ValidateEmail;

use super::operation_result::Failure;

/// Eagerly evaluated list of field rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    errors: Vec<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and not blank.
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{} is required.", field));
        }
        self
    }

    /// Length in characters must fall within `min..=max`.
    ///
    /// Blank values are left to `required` so a missing field yields one
    /// message rather than two.
    pub fn length(mut self, field: &str, value: &str, min: usize, max: usize) -> Self {
        if value.trim().is_empty() {
            return self;
        }
        let len = value.chars().count();
        if len < min {
            self.errors
                .push(format!("{} must be at least {} characters long.", field, min));
        } else if len > max {
            self.errors
                .push(format!("{} must be at most {} characters long.", field, max));
        }
        self
    }

    /// Value must look like an email address.
    pub fn email(mut self, field: &str, value: &str) -> Self {
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.errors.push(format!("{} is not in a valid format.", field));
        }
        self
    }

    /// Arbitrary predicate with its own message.
    pub fn check(mut self, condition: bool, message: impl Into<String>) -> Self {
        if !condition {
            self.errors.push(message.into());
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Collapse into a single business-validation failure, if any rule failed.
    pub fn finish(self) -> Result<(), Failure> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Failure::failure_business_validation(self.errors.join(" ")))
        }
    }
}

/// Email shape check shared by the validators and the user service.
pub fn is_valid_email(value: &str) -> bool {
    value.validate_email()
}
