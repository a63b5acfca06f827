//! External Collaborators
//!
//! HTTP clients for the mail relay, captcha verification and the remote log
//! collector, plus a `tracing`-only log sink. Every client checks its
//! configuration before making a call and reports outcomes in an
//! `OperationResult`.

mod captcha;
mod email;
mod log_shipper;

pub use captcha::RecaptchaVerifier;
pub use email::HttpEmailSender;
pub use log_shipper::{HttpLogShipper, TracingLogSink};

use std::time::Duration;

use reqwest::Client;

use crate::infrastructure::metrics;
use crate::shared::operation_result::Failure;

/// HTTP client with the given request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Map a transport error to a failure, keeping it as the cause.
pub(crate) fn request_failure(service: &str, e: reqwest::Error) -> Failure {
    let failure = if e.is_timeout() {
        Failure::failure_timeout(format!("The {} service did not respond in time.", service))
    } else if e.is_connect() || e.is_request() {
        Failure::failure_network(format!("The {} service could not be reached.", service))
    } else if e.is_decode() {
        Failure::failure_external_service(format!(
            "The {} service returned an unreadable response.",
            service
        ))
    } else {
        Failure::failure_external_service(format!("The {} service call failed.", service))
    };
    tracing::warn!(service, error = %e, category = %failure.category(), "External call failed");
    metrics::record_external_call(service, failure.category().as_str());
    failure.with_cause(e)
}

/// Failure for a non-success HTTP status.
pub(crate) fn status_failure(service: &str, status: reqwest::StatusCode) -> Failure {
    tracing::warn!(service, status = status.as_u16(), "External service rejected the call");
    metrics::record_external_call(service, "ExternalService");
    Failure::failure_external_service(format!(
        "The {} service responded with status {}.",
        service,
        status.as_u16()
    ))
}
