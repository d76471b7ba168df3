// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock description adapter for deterministic testing.
//!
//! `MockDescriber` treats the media bytes as UTF-8 text and returns them as
//! the description, so a test controls descriptions through the bytes its
//! fetcher serves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use archivist_core::traits::{DescriptionAdapter, PluginAdapter};
use archivist_core::types::{AdapterType, HealthStatus, MediaKind};
use archivist_core::ArchivistError;

/// A description adapter that echoes media bytes back as text.
///
/// Videos get a `"video: "` prefix so tests can tell the entry points apart.
pub struct MockDescriber {
    failing: Mutex<Vec<String>>,
    delay: Duration,
    calls: AtomicUsize,
    kinds: Mutex<Vec<MediaKind>>,
}

impl MockDescriber {
    pub fn new() -> Self {
        Self {
            failing: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            kinds: Mutex::new(Vec::new()),
        }
    }

    /// Waits `delay` (or until cancelled) before every description.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail any media whose bytes contain `marker`.
    pub async fn fail_on(&self, marker: &str) {
        self.failing.lock().await.push(marker.to_string());
    }

    /// Stop failing on every marker.
    pub async fn recover(&self) {
        self.failing.lock().await.clear();
    }

    /// Number of description calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Media kinds described so far, in call order.
    pub async fn kinds(&self) -> Vec<MediaKind> {
        self.kinds.lock().await.clone()
    }

    async fn respond(
        &self,
        kind: MediaKind,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().await.push(kind);

        if !self.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ArchivistError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        let text = String::from_utf8_lossy(data).into_owned();
        if self
            .failing
            .lock()
            .await
            .iter()
            .any(|marker| text.contains(marker.as_str()))
        {
            return Err(ArchivistError::DescriptionUnavailable {
                message: format!("mock failure for {text:?}"),
                source: None,
            });
        }

        Ok(match kind {
            MediaKind::Image => text,
            MediaKind::Video => format!("video: {text}"),
        })
    }
}

impl Default for MockDescriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockDescriber {
    fn name(&self) -> &str {
        "mock-describer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Description
    }

    async fn health_check(&self) -> Result<HealthStatus, ArchivistError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ArchivistError> {
        Ok(())
    }
}

#[async_trait]
impl DescriptionAdapter for MockDescriber {
    async fn describe_image(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        self.respond(MediaKind::Image, data, cancel).await
    }

    async fn describe_video(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        self.respond(MediaKind::Video, data, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_bytes_as_description() {
        let describer = MockDescriber::new();
        let cancel = CancellationToken::new();
        let text = describer.describe_image(b"a red bicycle", &cancel).await.unwrap();
        assert_eq!(text, "a red bicycle");
        let text = describer.describe_video(b"a cat", &cancel).await.unwrap();
        assert_eq!(text, "video: a cat");
        assert_eq!(describer.calls(), 2);
        assert_eq!(describer.kinds().await, vec![MediaKind::Image, MediaKind::Video]);
    }

    #[tokio::test]
    async fn marked_media_fails_until_recovered() {
        let describer = MockDescriber::new();
        let cancel = CancellationToken::new();
        describer.fail_on("broken").await;
        let err = describer.describe_image(b"broken jpeg", &cancel).await.unwrap_err();
        assert!(matches!(err, ArchivistError::DescriptionUnavailable { .. }));

        describer.recover().await;
        assert!(describer.describe_image(b"broken jpeg", &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn delay_observes_cancellation() {
        let describer = MockDescriber::new().with_delay(Duration::from_secs(3600));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = describer.describe_image(b"x", &cancel).await.unwrap_err();
        assert!(matches!(err, ArchivistError::Cancelled));
    }
}
