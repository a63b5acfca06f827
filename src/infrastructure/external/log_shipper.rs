//! Log sinks.
//!
//! `HttpLogShipper` posts entries to a remote collector; `TracingLogSink`
//! writes them to the local subscriber only. Every entry is traced either way.

use async_trait::async_trait;
use reqwest::Client;

use super::{build_client, request_failure, status_failure};
use crate::config::LogShippingSettings;
use crate::domain::{Log, LogLevel, LogSink};
use crate::infrastructure::metrics;
use crate::shared::operation_result::{Failure, OperationResult};

const SERVICE: &str = "log_shipping";

fn trace_log(log: &Log) {
    match log.level() {
        LogLevel::Information => tracing::info!(
            entity = log.entity_type(),
            operation = log.operation().as_str(),
            "{}",
            log.message()
        ),
        LogLevel::Warning => tracing::warn!(
            entity = log.entity_type(),
            operation = log.operation().as_str(),
            "{}",
            log.message()
        ),
        LogLevel::Error | LogLevel::Critical => tracing::error!(
            entity = log.entity_type(),
            operation = log.operation().as_str(),
            level = log.level().as_str(),
            snapshot = log.entity_snapshot(),
            "{}",
            log.message()
        ),
    }
}

/// Sink that only traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

#[async_trait]
impl LogSink for TracingLogSink {
    async fn create_log(&self, log: &Log) -> OperationResult<bool> {
        trace_log(log);
        OperationResult::success(true, "Log recorded.")
    }
}

/// Sink that posts each entry as JSON to a collector endpoint.
#[derive(Clone)]
pub struct HttpLogShipper {
    client: Client,
    settings: LogShippingSettings,
}

impl HttpLogShipper {
    pub fn new(settings: LogShippingSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            settings,
        })
    }

    async fn ship(&self, log: &Log) -> Result<bool, Failure> {
        let Some(endpoint) = self.settings.endpoint.as_deref() else {
            return Err(Failure::failure_configuration_missing(
                "The log collector endpoint is not configured.",
            ));
        };

        let mut request = self.client.post(endpoint).json(log);
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
        Ok(true)
    }
}

#[async_trait]
impl LogSink for HttpLogShipper {
    async fn create_log(&self, log: &Log) -> OperationResult<bool> {
        trace_log(log);
        OperationResult::from_result(self.ship(log).await, "Log shipped successfully.")
    }
}
