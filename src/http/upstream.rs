//! Outbound call to the third-party endpoint used by `/api/items`.
//!
//! # Responsibilities
//! - Issue one GET per call, bounded by the configured timeout
//! - Wrap it in a `fetch_details` client span and inject `traceparent`
//! - Report the outcome as a value; callers decide how to log it

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::field::Empty;
use tracing::{Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::UpstreamConfig;
use crate::observability::tracing::mark_error;
use crate::observability::Telemetry;

/// Why the outbound call produced no response.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Client for the configured upstream URL.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the upstream resource. Any HTTP status is `Ok`; only a missing
    /// response is an error.
    pub async fn fetch_details(&self, telemetry: &Telemetry) -> Result<StatusCode, UpstreamError> {
        let span = tracing::info_span!(
            "fetch_details",
            otel.kind = "client",
            otel.status_code = Empty,
            otel.status_message = Empty,
            http.method = "GET",
            http.url = %self.url,
            http.status_code = Empty,
        );

        async {
            let span = Span::current();
            let mut headers = HeaderMap::new();
            telemetry.inject_context(&span.context(), &mut headers);

            let result = self.send(headers).await;
            match &result {
                Ok(status) => {
                    span.record("http.status_code", status.as_u16());
                    if status.is_server_error() {
                        mark_error(&span, &format!("upstream returned {}", status));
                    }
                }
                Err(e) => mark_error(&span, &e.to_string()),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn send(&self, headers: HeaderMap) -> Result<StatusCode, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Upstream responded");
        Ok(status)
    }

    fn classify(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(e)
        }
    }
}
