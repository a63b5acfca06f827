//! reCAPTCHA-compatible verification client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{build_client, request_failure, status_failure};
use crate::config::CaptchaSettings;
use crate::domain::CaptchaVerifier;
use crate::infrastructure::metrics;
use crate::shared::operation_result::{Failure, OperationResult};

const SERVICE: &str = "captcha";

/// Body returned by `siteverify`.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: Client,
    settings: CaptchaSettings,
}

impl RecaptchaVerifier {
    pub fn new(settings: CaptchaSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            settings,
        })
    }

    async fn verify(&self, token: &str) -> Result<bool, Failure> {
        let Some(secret) = self.settings.secret.as_deref() else {
            return Err(Failure::failure_configuration_missing(
                "The captcha secret is not configured.",
            ));
        };
        if token.trim().is_empty() {
            return Err(Failure::failure_user_input("Captcha token not submitted."));
        }

        let response = self
            .client
            .post(&self.settings.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .map_err(|e| request_failure(SERVICE, e))?;
        if !response.status().is_success() {
            return Err(status_failure(SERVICE, response.status()));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| request_failure(SERVICE, e))?;
        metrics::record_external_call(SERVICE, "success");

        if !body.success {
            debug!(error_codes = ?body.error_codes, "Captcha rejected");
            return Err(Failure::failure_data_submitted_invalid(
                "The captcha token is invalid.",
            ));
        }
        Ok(true)
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    #[instrument(skip_all)]
    async fn validate(&self, token: &str) -> OperationResult<bool> {
        OperationResult::from_result(self.verify(token).await, "Captcha verified successfully.")
    }
}
