//! Mail relay client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};

use super::{build_client, request_failure, status_failure};
use crate::config::EmailSettings;
use crate::domain::EmailSender;
use crate::infrastructure::metrics;
use crate::shared::operation_result::{Failure, OperationResult};

const SERVICE: &str = "email";

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends plain-text messages by posting JSON to a mail relay.
#[derive(Clone)]
pub struct HttpEmailSender {
    client: Client,
    settings: EmailSettings,
}

impl HttpEmailSender {
    pub fn new(settings: EmailSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            settings,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<bool, Failure> {
        let (Some(relay_url), Some(from)) = (
            self.settings.relay_url.as_deref(),
            self.settings.from_address.as_deref(),
        ) else {
            return Err(Failure::failure_configuration_missing(
                "The email relay is not configured.",
            ));
        };
        if to.trim().is_empty() {
            return Err(Failure::failure_user_input("The recipient address is missing."));
        }

        let mut request = self.client.post(relay_url).json(&OutgoingMessage {
            from,
            to,
            subject,
            text: body,
        });
        if let Some(api_key) = &self.settings.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_failure(SERVICE, e))?;
        if !response.status().is_success() {
            return Err(status_failure(SERVICE, response.status()));
        }

        metrics::record_external_call(SERVICE, "success");
        info!(to, "Email sent");
        Ok(true)
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[instrument(skip(self, body))]
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> OperationResult<bool> {
        OperationResult::from_result(self.send(to, subject, body).await, "Email sent successfully.")
    }
}
