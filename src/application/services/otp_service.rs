//! One-Time Passcode Service
//!
//! Generates 6-digit passcodes, keeps them in the [`OtpStore`] under the
//! user's email for a limited time, delivers them by email and checks
//! submitted codes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use rand::Rng;
use tracing::{info, instrument};

use crate::config::OtpSettings;
use crate::domain::{EmailSender, Log, LogSink, OperationKind, OtpStore};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::operation_result::{Failure, OperationResult};

use super::entity_service::ship_log;

/// OTP service trait for dependency injection
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OtpService: Send + Sync {
    /// Generate, store and email a new passcode, replacing any previous one.
    async fn generate_otp(&self, email: &str) -> OperationResult<bool>;

    /// Check a submitted passcode. A correct code stays valid until it expires.
    async fn validate_otp(&self, email: &str, otp: &str) -> OperationResult<bool>;
}

/// Uniformly random code in `000000..=999999`.
pub fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

/// Cache key for an email: trimmed and lower-cased.
fn cache_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// OtpService implementation
pub struct OtpServiceImpl {
    store: Arc<dyn OtpStore>,
    email_sender: Arc<dyn EmailSender>,
    log_sink: Arc<dyn LogSink>,
    ttl: Duration,
    subject: String,
}

impl OtpServiceImpl {
    pub fn new(
        store: Arc<dyn OtpStore>,
        email_sender: Arc<dyn EmailSender>,
        log_sink: Arc<dyn LogSink>,
        settings: &OtpSettings,
    ) -> Self {
        Self {
            store,
            email_sender,
            log_sink,
            ttl: settings.ttl(),
            subject: settings.email_subject.clone(),
        }
    }

    fn cache_failure(&self, e: AppError, message: &str) -> Failure {
        tracing::error!(error = %e, "{}", message);
        ship_log(
            self.log_sink.clone(),
            Log::error_for::<()>(message, "Otp", None, OperationKind::Otp),
        );
        Failure::failure_external_service(message).with_cause(e)
    }

    async fn try_generate(&self, email: &str) -> Result<bool, Failure> {
        let key = cache_key(email);
        if key.is_empty() {
            return Err(Failure::failure_user_input("Email not submitted."));
        }

        let code = generate_code();
        if let Err(e) = self.store.set(&key, &code, self.ttl).await {
            return Err(self.cache_failure(e, "Failed to store the OTP."));
        }
        metrics::record_otp_issued();

        let body = format!(
            "Your one-time passcode is {}. It expires in {} minutes.",
            code,
            self.ttl.as_secs().div_ceil(60)
        );
        let sent = self
            .email_sender
            .send_email(&key, &self.subject, &body)
            .await
            .into_result()?;

        info!(email = %key, "OTP generated and sent");
        Ok(sent)
    }

    async fn try_validate(&self, email: &str, otp: &str) -> Result<bool, Failure> {
        if otp.trim().is_empty() {
            return Err(Failure::failure_user_input("OTP not submitted."));
        }
        let key = cache_key(email);
        if key.is_empty() {
            return Err(Failure::failure_user_input("Email not submitted."));
        }

        let stored = match self.store.get(&key).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.cache_failure(e, "Failed to read the OTP.")),
        };
        match stored {
            None => Err(Failure::failure_authentication(
                "The OTP has expired or was never generated.",
            )),
            Some(code) if code == otp.trim() => Ok(true),
            Some(_) => Err(Failure::failure_authentication("The OTP is incorrect.")),
        }
    }
}

#[async_trait]
impl OtpService for OtpServiceImpl {
    #[instrument(skip(self))]
    async fn generate_otp(&self, email: &str) -> OperationResult<bool> {
        OperationResult::from_result(
            self.try_generate(email).await,
            "OTP generated and sent successfully.",
        )
    }

    #[instrument(skip(self, otp))]
    async fn validate_otp(&self, email: &str, otp: &str) -> OperationResult<bool> {
        OperationResult::from_result(self.try_validate(email, otp).await, "The OTP is valid.")
    }
}
