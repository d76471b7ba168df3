// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media intake normalization.
//!
//! Turns the loosely-typed attachments of an inbound event into archivable
//! candidates: classifies each into a [`MediaKind`], drops oversized and
//! unsupported attachments, and drops file ids already in the archive or
//! repeated earlier in the same event.

use std::collections::HashSet;

use archivist_config::model::IngestConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::ArchiveStore;
use archivist_core::types::{Attachment, AttachmentKind, MediaKind};
use tracing::debug;

/// Limits applied during intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Attachments of this size or larger are dropped.
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20_000_000,
        }
    }
}

impl From<&IngestConfig> for IntakeConfig {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
        }
    }
}

/// An attachment accepted for archiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub file_id: String,
    pub kind: MediaKind,
}

/// Result of normalizing one event's attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intake {
    /// Accepted attachments, in attachment order.
    pub candidates: Vec<Candidate>,
    /// Already archived, or repeated within the event.
    pub known: usize,
    /// Too large to archive.
    pub oversized: usize,
    /// Not an image or a video.
    pub unsupported: usize,
}

/// Maps a transport kind hint onto the archive's media kinds.
///
/// Documents are classified by mime type; a document without one is
/// unsupported.
pub fn classify(kind: &AttachmentKind) -> Option<MediaKind> {
    match kind {
        AttachmentKind::Photo => Some(MediaKind::Image),
        AttachmentKind::Video | AttachmentKind::Animation => Some(MediaKind::Video),
        AttachmentKind::Document { mime_type } => {
            let mime = mime_type.as_deref()?;
            if mime.contains("image") {
                Some(MediaKind::Image)
            } else if mime.contains("video") {
                Some(MediaKind::Video)
            } else {
                None
            }
        }
    }
}

/// Normalizes `attachments` against the archive.
///
/// The only store access is a read-only [`ArchiveStore::file_exists`] per
/// surviving attachment.
pub async fn normalize(
    attachments: &[Attachment],
    config: &IntakeConfig,
    store: &dyn ArchiveStore,
) -> Result<Intake, ArchivistError> {
    let mut intake = Intake::default();
    let mut seen = HashSet::new();

    for attachment in attachments {
        let Some(kind) = classify(&attachment.kind) else {
            debug!(file_id = %attachment.file_id, kind = ?attachment.kind, "unsupported attachment");
            intake.unsupported += 1;
            continue;
        };

        if attachment.size >= config.max_file_size {
            debug!(
                file_id = %attachment.file_id,
                size = attachment.size,
                limit = config.max_file_size,
                "attachment too large"
            );
            intake.oversized += 1;
            continue;
        }

        if !seen.insert(attachment.file_id.as_str())
            || store.file_exists(&attachment.file_id).await?
        {
            debug!(file_id = %attachment.file_id, "attachment already archived");
            intake.known += 1;
            continue;
        }

        intake.candidates.push(Candidate {
            file_id: attachment.file_id.clone(),
            kind,
        });
    }

    Ok(intake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivist_config::model::StorageConfig;
    use archivist_core::types::ChatKind;
    use archivist_storage::SqliteArchive;

    async fn store() -> SqliteArchive {
        let store = SqliteArchive::new(StorageConfig {
            database_path: ":memory:".into(),
            wal_mode: false,
        });
        store.initialize().await.unwrap();
        store
    }

    fn photo(file_id: &str, size: u64) -> Attachment {
        Attachment {
            file_id: file_id.into(),
            size,
            kind: AttachmentKind::Photo,
        }
    }

    fn document(file_id: &str, mime: Option<&str>) -> Attachment {
        Attachment {
            file_id: file_id.into(),
            size: 10,
            kind: AttachmentKind::Document {
                mime_type: mime.map(str::to_string),
            },
        }
    }

    #[test]
    fn classification_rules() {
        assert_eq!(classify(&AttachmentKind::Photo), Some(MediaKind::Image));
        assert_eq!(classify(&AttachmentKind::Video), Some(MediaKind::Video));
        assert_eq!(classify(&AttachmentKind::Animation), Some(MediaKind::Video));
        let doc = |m: Option<&str>| AttachmentKind::Document {
            mime_type: m.map(str::to_string),
        };
        assert_eq!(classify(&doc(Some("image/png"))), Some(MediaKind::Image));
        assert_eq!(classify(&doc(Some("video/mp4"))), Some(MediaKind::Video));
        assert_eq!(classify(&doc(Some("application/pdf"))), None);
        assert_eq!(classify(&doc(None)), None);
    }

    #[tokio::test]
    async fn size_limit_is_strict() {
        let store = store().await;
        let config = IntakeConfig { max_file_size: 1000 };
        let attachments = [photo("at-limit", 1000), photo("under", 999)];

        let intake = normalize(&attachments, &config, &store).await.unwrap();
        assert_eq!(
            intake.candidates,
            vec![Candidate {
                file_id: "under".into(),
                kind: MediaKind::Image
            }]
        );
        assert_eq!(intake.oversized, 1);
    }

    #[tokio::test]
    async fn documents_without_media_mime_are_ignored() {
        let store = store().await;
        let attachments = [
            document("pdf", Some("application/pdf")),
            document("bare", None),
            document("clip", Some("video/webm")),
        ];

        let intake = normalize(&attachments, &IntakeConfig::default(), &store)
            .await
            .unwrap();
        assert_eq!(intake.unsupported, 2);
        assert_eq!(intake.candidates.len(), 1);
        assert_eq!(intake.candidates[0].kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn archived_and_repeated_ids_are_dropped() {
        let store = store().await;
        store.get_or_create_chat(-1, ChatKind::Group).await.unwrap();
        let message = store.create_message(-1, 7, 1).await.unwrap();
        store
            .create_file("old", &message.id, MediaKind::Image)
            .await
            .unwrap();

        let attachments = [photo("old", 10), photo("new", 10), photo("new", 10)];
        let intake = normalize(&attachments, &IntakeConfig::default(), &store)
            .await
            .unwrap();
        assert_eq!(intake.known, 2);
        assert_eq!(intake.candidates.len(), 1);
        assert_eq!(intake.candidates[0].file_id, "new");
    }

    #[tokio::test]
    async fn candidates_keep_attachment_order() {
        let store = store().await;
        let attachments = [photo("c", 1), photo("a", 1), photo("b", 1)];
        let intake = normalize(&attachments, &IntakeConfig::default(), &store)
            .await
            .unwrap();
        let ids: Vec<_> = intake.candidates.iter().map(|c| c.file_id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
