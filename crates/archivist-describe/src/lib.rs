// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multimodal description provider for the Archivist media archive.
//!
//! This crate implements [`DescriptionAdapter`] on top of a Mistral-compatible
//! chat completions API. Images are sent as a single inline JPEG; videos are
//! reduced to a fixed number of sampled frames sent together in one request.
//! Every provider call goes through an explicit [`RetryPolicy`].

pub mod client;
pub mod frames;
pub mod prompt;
pub mod retry;
pub mod types;

use std::sync::Arc;

use archivist_config::model::DescribeConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::{DescriptionAdapter, PluginAdapter};
use archivist_core::types::{AdapterType, HealthStatus};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use crate::client::MistralClient;
pub use crate::frames::{sample_indices, FfmpegFrames, FrameSource};
pub use crate::retry::RetryPolicy;

use crate::types::{ChatMessage, ChatRequest, ContentPart};

/// Description generator implementing [`DescriptionAdapter`].
///
/// API key resolution order: config -> `MISTRAL_API_KEY` env var -> error.
pub struct MediaDescriber {
    client: MistralClient,
    frames: Arc<dyn FrameSource>,
    policy: RetryPolicy,
    language: String,
    video_frames: usize,
}

impl MediaDescriber {
    /// Creates a describer from configuration, extracting frames with ffmpeg.
    pub fn new(config: &DescribeConfig) -> Result<Self, ArchivistError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = MistralClient::new(&api_key, &config.base_url, &config.model)?;

        info!(
            model = %config.model,
            language = %config.language,
            "description provider initialized"
        );

        Ok(Self::with_parts(
            client,
            Arc::new(FfmpegFrames::default()),
            RetryPolicy::from_config(config),
            config,
        ))
    }

    /// Assembles a describer from explicit parts.
    pub fn with_parts(
        client: MistralClient,
        frames: Arc<dyn FrameSource>,
        policy: RetryPolicy,
        config: &DescribeConfig,
    ) -> Self {
        Self {
            client,
            frames,
            policy,
            language: config.language.clone(),
            video_frames: config.video_frames,
        }
    }

    fn request(&self, instruction: String, images: &[Vec<u8>]) -> ChatRequest {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::Text { text: instruction });
        parts.extend(images.iter().map(|jpeg| ContentPart::jpeg(jpeg)));

        ChatRequest {
            model: self.client.model().to_string(),
            messages: vec![
                ChatMessage::system(prompt::system_prompt(&self.language)),
                ChatMessage::user(parts),
            ],
        }
    }

    async fn send(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        self.policy
            .run(cancel, || self.client.complete(&request))
            .await
    }
}

#[async_trait]
impl PluginAdapter for MediaDescriber {
    fn name(&self) -> &str {
        "mistral"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Description
    }

    async fn health_check(&self) -> Result<HealthStatus, ArchivistError> {
        // Avoid spending provider quota on health checks.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ArchivistError> {
        debug!("description provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl DescriptionAdapter for MediaDescriber {
    async fn describe_image(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        let request = self.request(prompt::image_instruction(&self.language), &[data.to_vec()]);
        self.send(request, cancel).await
    }

    async fn describe_video(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        let frames = self.frames.frames(data, self.video_frames, cancel).await?;
        if frames.is_empty() {
            return Err(ArchivistError::DescriptionUnavailable {
                message: "no video frames could be decoded".into(),
                source: None,
            });
        }
        debug!(frames = frames.len(), "describing video");

        let request = self.request(prompt::video_instruction(&self.language), &frames);
        self.send(request, cancel).await
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, ArchivistError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("MISTRAL_API_KEY").map_err(|_| {
        ArchivistError::Config(
            "description API key not found. Set describe.api_key in config or MISTRAL_API_KEY environment variable.".into(),
        )
    })
}
