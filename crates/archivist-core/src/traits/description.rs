// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Description adapter trait for multimodal media description providers.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ArchivistError;
use crate::traits::adapter::PluginAdapter;
use crate::types::MediaKind;

/// Adapter that turns raw media bytes into a search-oriented description.
///
/// Both entry points may wait on provider throttling for a long time; the
/// `cancel` token aborts such waits with [`ArchivistError::Cancelled`].
#[async_trait]
pub trait DescriptionAdapter: PluginAdapter {
    /// Describes a single image.
    async fn describe_image(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError>;

    /// Describes a video as a whole from a fixed number of sampled frames.
    async fn describe_video(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError>;

    /// Dispatches to the entry point matching `kind`.
    async fn describe(
        &self,
        kind: MediaKind,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        match kind {
            MediaKind::Image => self.describe_image(data, cancel).await,
            MediaKind::Video => self.describe_video(data, cancel).await,
        }
    }
}
