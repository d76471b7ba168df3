// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the ingest pipeline and query resolver over a
//! temp SQLite archive with mock providers and an in-memory fetcher.

use std::sync::Arc;

use archivist_config::model::{IngestConfig, StorageConfig};
use archivist_core::types::{Attachment, AttachmentKind, ChatKind, InboundMedia, Message};
use archivist_core::{ArchiveStore, ArchivistError};
use archivist_pipeline::{IngestReport, Ingestor, QueryResolver, SearchMode};
use archivist_storage::SqliteArchive;
use tokio_util::sync::CancellationToken;

use crate::mock_describer::MockDescriber;
use crate::mock_embedder::MockEmbedder;
use crate::mock_fetcher::MockFetcher;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    ingest: IngestConfig,
    mode: SearchMode,
    describer: MockDescriber,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            ingest: IngestConfig::default(),
            mode: SearchMode::default(),
            describer: MockDescriber::new(),
        }
    }

    /// Set the attachment size limit.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.ingest.max_file_size = bytes;
        self
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_describer(mut self, describer: MockDescriber) -> Self {
        self.describer = describer;
        self
    }

    /// Build the test harness, creating and migrating the temp database.
    pub async fn build(self) -> Result<TestHarness, ArchivistError> {
        let temp_dir = tempfile::TempDir::new().map_err(ArchivistError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let store = Arc::new(SqliteArchive::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        store.initialize().await?;

        let describer = Arc::new(self.describer);
        let embedder = Arc::new(MockEmbedder::new());
        let ingestor = Ingestor::new(store.clone(), describer.clone(), embedder.clone(), &self.ingest);
        let resolver = QueryResolver::new(store.clone(), embedder.clone(), self.mode);

        Ok(TestHarness {
            store,
            describer,
            embedder,
            fetcher: MockFetcher::new(),
            ingestor,
            resolver,
            cancel: CancellationToken::new(),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete pipeline over temp storage and mock providers.
pub struct TestHarness {
    /// SQLite archive (temp DB, cleaned up on drop).
    pub store: Arc<SqliteArchive>,
    pub describer: Arc<MockDescriber>,
    pub embedder: Arc<MockEmbedder>,
    /// Media served to the ingestor, keyed by file id.
    pub fetcher: MockFetcher,
    pub ingestor: Ingestor,
    pub resolver: QueryResolver,
    /// Shutdown token handed to every ingest.
    pub cancel: CancellationToken,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default limits and search mode.
    pub async fn new() -> Result<Self, ArchivistError> {
        Self::builder().build().await
    }

    /// Registers media bytes for `file_id`. The mock describer echoes them
    /// back, so `content` doubles as the file's description.
    pub async fn add_media(&self, file_id: &str, content: &str) {
        self.fetcher.insert(file_id, content).await;
    }

    /// Ingests a group message carrying `attachments`.
    pub async fn post(
        &self,
        chat_id: i64,
        external_message_id: i64,
        attachments: Vec<Attachment>,
    ) -> Result<IngestReport, ArchivistError> {
        let event = InboundMedia {
            chat_id,
            chat_kind: ChatKind::Group,
            sender_id: 1000,
            external_message_id,
            attachments,
        };
        self.ingestor.ingest(&event, &self.fetcher, &self.cancel).await
    }

    /// Ingests a single photo.
    pub async fn post_photo(
        &self,
        chat_id: i64,
        external_message_id: i64,
        file_id: &str,
        size: u64,
    ) -> Result<IngestReport, ArchivistError> {
        self.post(
            chat_id,
            external_message_id,
            vec![Attachment {
                file_id: file_id.into(),
                size,
                kind: AttachmentKind::Photo,
            }],
        )
        .await
    }

    /// Resolves a text query.
    pub async fn search(&self, text: &str) -> Result<Vec<Message>, ArchivistError> {
        self.resolver.resolve(text).await
    }

    pub async fn file_count(&self) -> Result<u64, ArchivistError> {
        Ok(self.store.stats().await?.files)
    }
}
