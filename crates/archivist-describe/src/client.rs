// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a Mistral-compatible chat completions API.
//!
//! Provides [`MistralClient`] which handles request construction and bearer
//! authentication, and classifies every failure so the retry loop can decide
//! whether to try again. The client itself never retries.

use std::time::Duration;

use archivist_core::error::BoxError;
use archivist_core::ArchivistError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// How a failed provider call should be treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rate limiting or temporary unavailability (429, 503).
    Throttled,
    /// Other server errors, transport errors, timeouts.
    Transient,
    /// Client errors and malformed responses. Never retried.
    Fatal,
}

/// A classified provider failure.
#[derive(Debug)]
pub struct ProviderFailure {
    pub class: FailureClass,
    pub message: String,
    pub source: Option<BoxError>,
}

impl ProviderFailure {
    fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            source: None,
        }
    }

    fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Converts into the pipeline-facing error once retrying is over.
    pub fn into_unavailable(self) -> ArchivistError {
        ArchivistError::DescriptionUnavailable {
            message: self.message,
            source: self.source,
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.class, self.message)
    }
}

/// HTTP client for chat completions.
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl MistralClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - bearer token
    /// * `base_url` - API root, e.g. `https://api.mistral.ai`
    /// * `model` - vision-capable model identifier
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, ArchivistError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                ArchivistError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ArchivistError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Sends one completion request and returns the generated text verbatim.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderFailure> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                ProviderFailure::new(FailureClass::Transient, format!("HTTP request failed: {e}"))
                    .with_source(e)
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        if status.is_success() {
            let body = response.text().await.map_err(|e| {
                ProviderFailure::new(
                    FailureClass::Transient,
                    format!("failed to read response body: {e}"),
                )
                .with_source(e)
            })?;
            let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
                ProviderFailure::new(
                    FailureClass::Fatal,
                    format!("failed to parse API response: {e}"),
                )
                .with_source(e)
            })?;
            return parsed.text().map(str::to_string).ok_or_else(|| {
                ProviderFailure::new(FailureClass::Fatal, "response contained no text choice")
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => match &api_err.type_ {
                Some(kind) => format!("API error {status} ({kind}): {}", api_err.message_text()),
                None => format!("API error {status}: {}", api_err.message_text()),
            },
            Err(_) => format!("API returned {status}: {body}"),
        };
        Err(ProviderFailure::new(classify_status(status), message))
    }
}

/// Returns true for HTTP status codes that mean "slow down".
fn is_throttled(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 503)
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    status.is_server_error() || status.as_u16() == 408
}

/// Classify a non-success HTTP status.
pub fn classify_status(status: reqwest::StatusCode) -> FailureClass {
    if is_throttled(status) {
        FailureClass::Throttled
    } else if is_transient_error(status) {
        FailureClass::Transient
    } else {
        FailureClass::Fatal
    }
}
