// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter backed by an Ollama server.
//!
//! Sends the whole batch to `POST {host}/api/embed` and checks that the
//! response has one vector per input, each of the configured width.

use std::time::Duration;

use archivist_config::model::EmbeddingConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::{EmbeddingAdapter, PluginAdapter};
use archivist_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedding adapter.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    host: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ArchivistError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ArchivistError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(
            host = %config.host,
            model = %config.model,
            dimensions = config.dimensions,
            "embedding provider initialized"
        );

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Overrides the host URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.host = url;
        self
    }

    /// Vector width this embedder promises.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn unavailable(message: impl Into<String>) -> ArchivistError {
        ArchivistError::EmbeddingUnavailable {
            message: message.into(),
            source: None,
        }
    }

    fn check(&self, texts: usize, embeddings: &[Vec<f32>]) -> Result<(), ArchivistError> {
        if embeddings.len() != texts {
            return Err(Self::unavailable(format!(
                "expected {texts} embeddings, got {}",
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(Self::unavailable(format!(
                "expected {}-dimensional embeddings, got {}",
                self.dimensions,
                bad.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ArchivistError> {
        match self
            .client
            .get(format!("{}/api/tags", self.host))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "ollama returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("ollama unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), ArchivistError> {
        debug!("embedding provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ArchivistError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: self.dimensions,
            });
        }

        let request = EmbedRequest {
            model: &self.model,
            input: &input.texts,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| ArchivistError::EmbeddingUnavailable {
                message: format!("embedding request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "embedding request rejected");
            metrics::counter!("archivist_embedding_failures_total").increment(1);
            return Err(Self::unavailable(format!("ollama returned {status}: {body}")));
        }

        let parsed: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| ArchivistError::EmbeddingUnavailable {
                    message: format!("failed to parse embedding response: {e}"),
                    source: Some(Box::new(e)),
                })?;

        if let Err(e) = self.check(input.texts.len(), &parsed.embeddings) {
            metrics::counter!("archivist_embedding_failures_total").increment(1);
            return Err(e);
        }

        debug!(count = parsed.embeddings.len(), "embedded batch");
        Ok(EmbeddingOutput {
            embeddings: parsed.embeddings,
            dimensions: self.dimensions,
        })
    }
}
