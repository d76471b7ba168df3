// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingest orchestration for one inbound media event.
//!
//! The [`Ingestor`] records the chat, sender and message, normalizes the
//! attachments, creates one file row per new candidate, then describes every
//! created file and embeds all descriptions in a single batch. A file's
//! description and embedding are written together, so a file is either
//! complete or has neither.

use std::sync::Arc;
use std::time::Duration;

use archivist_config::model::IngestConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::{ArchiveStore, DescriptionAdapter, EmbeddingAdapter, MediaFetcher};
use archivist_core::types::{EmbeddingInput, File, InboundMedia, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::intake::{self, IntakeConfig};
use crate::recording;

/// Outcome of ingesting one event.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// The message row created for the event.
    pub message: Message,
    /// Files completed (described and embedded) by this call.
    pub archived: usize,
    /// Attachments already archived, including ones lost to a concurrent ingest.
    pub duplicates: usize,
    /// Files created but left without description and embedding.
    pub incomplete: usize,
    /// Attachments dropped as oversized or unsupported.
    pub dropped: usize,
}

/// Outcome of a reprocess sweep over incomplete files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReprocessReport {
    pub attempted: usize,
    pub archived: usize,
    pub incomplete: usize,
}

#[derive(Debug, Default)]
struct Completion {
    archived: usize,
    incomplete: usize,
}

/// Errors that end the whole event rather than a single file.
fn aborts_event(err: &ArchivistError) -> bool {
    matches!(
        err,
        ArchivistError::StorageUnavailable { .. } | ArchivistError::Cancelled
    )
}

/// Sequences intake, description, embedding and persistence.
pub struct Ingestor {
    store: Arc<dyn ArchiveStore>,
    describer: Arc<dyn DescriptionAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    intake: IntakeConfig,
    event_timeout: Duration,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn ArchiveStore>,
        describer: Arc<dyn DescriptionAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &IngestConfig,
    ) -> Self {
        Self {
            store,
            describer,
            embedder,
            intake: IntakeConfig::from(config),
            event_timeout: Duration::from_secs(config.event_timeout_secs),
        }
    }

    /// Overrides the per-event timeout.
    pub fn with_event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn ArchiveStore> {
        &self.store
    }

    /// Ingests one event.
    ///
    /// Per-file fetch and description failures leave that file incomplete;
    /// an embedding failure leaves the whole batch incomplete. Storage
    /// failures and cancellation (including the per-event timeout) abort the
    /// event. File rows already created are kept either way.
    pub async fn ingest(
        &self,
        event: &InboundMedia,
        fetcher: &dyn MediaFetcher,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, ArchivistError> {
        let token = cancel.child_token();
        match tokio::time::timeout(self.event_timeout, self.run(event, fetcher, &token)).await {
            Ok(result) => result,
            Err(_) => {
                token.cancel();
                warn!(
                    chat_id = event.chat_id,
                    message_id = event.external_message_id,
                    timeout_secs = self.event_timeout.as_secs_f64(),
                    "ingest timed out"
                );
                Err(ArchivistError::Cancelled)
            }
        }
    }

    async fn run(
        &self,
        event: &InboundMedia,
        fetcher: &dyn MediaFetcher,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, ArchivistError> {
        let chat = self
            .store
            .get_or_create_chat(event.chat_id, event.chat_kind)
            .await?;
        self.store.upsert_user(event.sender_id, chat.chat_id).await?;
        let message = self
            .store
            .create_message(chat.chat_id, event.sender_id, event.external_message_id)
            .await?;

        let intake = intake::normalize(&event.attachments, &self.intake, self.store.as_ref()).await?;
        let mut duplicates = intake.known;

        let mut created = Vec::with_capacity(intake.candidates.len());
        for candidate in &intake.candidates {
            match self
                .store
                .create_file(&candidate.file_id, &message.id, candidate.kind)
                .await
            {
                Ok(file) => created.push(file),
                Err(ArchivistError::DuplicateFile { file_id }) => {
                    debug!(file_id = %file_id, "file archived concurrently, skipping");
                    duplicates += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let completion = self.complete(created, fetcher, cancel).await?;

        info!(
            chat_id = chat.chat_id,
            message_id = %message.id,
            archived = completion.archived,
            duplicates,
            incomplete = completion.incomplete,
            dropped = intake.oversized + intake.unsupported,
            "ingested media event"
        );

        Ok(IngestReport {
            message,
            archived: completion.archived,
            duplicates,
            incomplete: completion.incomplete,
            dropped: intake.oversized + intake.unsupported,
        })
    }

    /// Describes and embeds files that are still missing an embedding,
    /// oldest first.
    pub async fn reprocess(
        &self,
        limit: usize,
        fetcher: &dyn MediaFetcher,
        cancel: &CancellationToken,
    ) -> Result<ReprocessReport, ArchivistError> {
        let files = self.store.incomplete_files(limit).await?;
        if files.is_empty() {
            info!("no incomplete files to reprocess");
            return Ok(ReprocessReport::default());
        }

        let attempted = files.len();
        info!(count = attempted, "reprocessing incomplete files");
        let completion = self.complete(files, fetcher, cancel).await?;
        Ok(ReprocessReport {
            attempted,
            archived: completion.archived,
            incomplete: completion.incomplete,
        })
    }

    async fn complete(
        &self,
        files: Vec<File>,
        fetcher: &dyn MediaFetcher,
        cancel: &CancellationToken,
    ) -> Result<Completion, ArchivistError> {
        let mut completion = Completion::default();
        let mut described = Vec::with_capacity(files.len());

        for file in files {
            if cancel.is_cancelled() {
                return Err(ArchivistError::Cancelled);
            }
            match self.describe_file(&file, fetcher, cancel).await {
                Ok(text) => described.push((file, text)),
                Err(e) if aborts_event(&e) => return Err(e),
                Err(e) => {
                    warn!(file_id = %file.file_id, error = %e, "file left incomplete");
                    completion.incomplete += 1;
                }
            }
        }

        if described.is_empty() {
            recording::record_incomplete(completion.incomplete);
            return Ok(completion);
        }

        let input = EmbeddingInput {
            texts: described.iter().map(|(_, text)| text.clone()).collect(),
        };
        let embedded = tokio::select! {
            _ = cancel.cancelled() => return Err(ArchivistError::Cancelled),
            result = self.embedder.embed(input) => result,
        };

        let embeddings = match embedded {
            Ok(output) if output.embeddings.len() == described.len() => output.embeddings,
            Ok(output) => {
                warn!(
                    expected = described.len(),
                    got = output.embeddings.len(),
                    "embedding count mismatch, batch left incomplete"
                );
                completion.incomplete += described.len();
                recording::record_incomplete(completion.incomplete);
                return Ok(completion);
            }
            Err(e) if aborts_event(&e) => return Err(e),
            Err(e) => {
                warn!(files = described.len(), error = %e, "embedding failed, batch left incomplete");
                completion.incomplete += described.len();
                recording::record_incomplete(completion.incomplete);
                return Ok(completion);
            }
        };

        for ((file, text), embedding) in described.into_iter().zip(embeddings) {
            self.store
                .complete_file(&file.file_id, &text, &embedding)
                .await?;
            recording::record_archived(file.media_kind);
            completion.archived += 1;
        }

        recording::record_incomplete(completion.incomplete);
        Ok(completion)
    }

    async fn describe_file(
        &self,
        file: &File,
        fetcher: &dyn MediaFetcher,
        cancel: &CancellationToken,
    ) -> Result<String, ArchivistError> {
        let data = tokio::select! {
            _ = cancel.cancelled() => return Err(ArchivistError::Cancelled),
            result = fetcher.fetch(&file.file_id) => result?,
        };
        debug!(
            file_id = %file.file_id,
            kind = file.media_kind.as_str(),
            bytes = data.len(),
            "describing file"
        );
        self.describer.describe(file.media_kind, &data, cancel).await
    }
}
