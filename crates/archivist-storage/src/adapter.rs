// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ArchiveStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use archivist_config::model::StorageConfig;
use archivist_core::types::{ArchiveStats, Chat, ChatKind, File, MediaKind, Message};
use archivist_core::{AdapterType, ArchiveStore, ArchivistError, HealthStatus, PluginAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed archive store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`ArchiveStore::initialize`].
pub struct SqliteArchive {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteArchive {
    /// Create a new SqliteArchive with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ArchivistError> {
        self.db
            .get()
            .ok_or_else(|| ArchivistError::storage("storage not initialized -- call initialize() first"))
    }

    async fn checkpoint(db: &Database) -> Result<(), ArchivistError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteArchive {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ArchivistError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ArchivistError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ArchiveStore for SqliteArchive {
    async fn initialize(&self) -> Result<(), ArchivistError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| ArchivistError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite archive initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ArchivistError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn get_or_create_chat(
        &self,
        chat_id: i64,
        kind: ChatKind,
    ) -> Result<Chat, ArchivistError> {
        queries::chats::get_or_create_chat(self.db()?, chat_id, kind).await
    }

    async fn upsert_user(&self, user_id: i64, chat_id: i64) -> Result<(), ArchivistError> {
        queries::users::upsert_user(self.db()?, user_id, chat_id).await
    }

    async fn create_message(
        &self,
        chat_id: i64,
        sender_id: i64,
        external_message_id: i64,
    ) -> Result<Message, ArchivistError> {
        queries::messages::create_message(self.db()?, chat_id, sender_id, external_message_id)
            .await
    }

    async fn get_message(&self, id: &str) -> Result<Message, ArchivistError> {
        queries::messages::get_message(self.db()?, id).await
    }

    async fn file_exists(&self, file_id: &str) -> Result<bool, ArchivistError> {
        queries::files::file_exists(self.db()?, file_id).await
    }

    async fn create_file(
        &self,
        file_id: &str,
        message_id: &str,
        kind: MediaKind,
    ) -> Result<File, ArchivistError> {
        queries::files::create_file(self.db()?, file_id, message_id, kind).await
    }

    async fn get_file(&self, file_id: &str) -> Result<File, ArchivistError> {
        queries::files::get_file(self.db()?, file_id).await
    }

    async fn update_file_description(
        &self,
        file_id: &str,
        description: &str,
    ) -> Result<(), ArchivistError> {
        queries::files::update_file_description(self.db()?, file_id, description).await
    }

    async fn update_file_embedding(
        &self,
        file_id: &str,
        embedding: &[f32],
    ) -> Result<(), ArchivistError> {
        queries::files::update_file_embedding(self.db()?, file_id, embedding).await
    }

    async fn complete_file(
        &self,
        file_id: &str,
        description: &str,
        embedding: &[f32],
    ) -> Result<(), ArchivistError> {
        queries::files::complete_file(self.db()?, file_id, description, embedding).await
    }

    async fn incomplete_files(&self, limit: usize) -> Result<Vec<File>, ArchivistError> {
        queries::files::incomplete_files(self.db()?, limit).await
    }

    async fn nearest_messages(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<Message>, ArchivistError> {
        queries::search::nearest_messages(self.db()?, query, k).await
    }

    async fn stats(&self) -> Result<ArchiveStats, ArchivistError> {
        let db = self.db()?;
        let chats = queries::chats::count_chats(db).await?;
        let messages = queries::messages::count_messages(db).await?;
        let (files, incomplete_files) = queries::files::count_files(db).await?;
        Ok(ArchiveStats {
            chats,
            messages,
            files,
            incomplete_files,
        })
    }
}
