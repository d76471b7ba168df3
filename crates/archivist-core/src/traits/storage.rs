// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::ArchivistError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ArchiveStats, Chat, ChatKind, File, MediaKind, Message};

/// Durable store for chats, messages and files, plus the vector index.
///
/// The store is the only component that mutates archived entities. Every
/// method runs as its own short statement or transaction.
#[async_trait]
pub trait ArchiveStore: PluginAdapter {
    /// Initializes the storage backend (migrations, extensions, etc.).
    async fn initialize(&self) -> Result<(), ArchivistError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ArchivistError>;

    // --- Chats and users ---

    /// Returns the chat, creating it if absent.
    ///
    /// Concurrent callers converge on a single row per `chat_id`.
    async fn get_or_create_chat(&self, chat_id: i64, kind: ChatKind)
    -> Result<Chat, ArchivistError>;

    /// Records a sender if it has not been seen before.
    async fn upsert_user(&self, user_id: i64, chat_id: i64) -> Result<(), ArchivistError>;

    // --- Messages ---

    /// Inserts a new message row. Never deduplicates.
    async fn create_message(
        &self,
        chat_id: i64,
        sender_id: i64,
        external_message_id: i64,
    ) -> Result<Message, ArchivistError>;

    /// Fetches a message by its generated id.
    async fn get_message(&self, id: &str) -> Result<Message, ArchivistError>;

    // --- Files ---

    /// Returns true if a file with this external id is archived.
    async fn file_exists(&self, file_id: &str) -> Result<bool, ArchivistError>;

    /// Inserts a file with no description or embedding.
    ///
    /// Fails with [`ArchivistError::DuplicateFile`] if the id already exists.
    async fn create_file(
        &self,
        file_id: &str,
        message_id: &str,
        kind: MediaKind,
    ) -> Result<File, ArchivistError>;

    /// Fetches a file by external id.
    async fn get_file(&self, file_id: &str) -> Result<File, ArchivistError>;

    /// Sets the description of an existing file.
    async fn update_file_description(
        &self,
        file_id: &str,
        description: &str,
    ) -> Result<(), ArchivistError>;

    /// Sets the embedding of an existing file.
    async fn update_file_embedding(
        &self,
        file_id: &str,
        embedding: &[f32],
    ) -> Result<(), ArchivistError>;

    /// Writes description and embedding together; either both land or neither.
    async fn complete_file(
        &self,
        file_id: &str,
        description: &str,
        embedding: &[f32],
    ) -> Result<(), ArchivistError>;

    /// Files still waiting for an embedding, oldest first.
    async fn incomplete_files(&self, limit: usize) -> Result<Vec<File>, ArchivistError>;

    // --- Retrieval ---

    /// Distinct messages ordered by ascending L2 distance between `query` and
    /// the embeddings of their files, at most `k`. Unembedded files are skipped.
    async fn nearest_messages(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<Message>, ArchivistError>;

    /// Row counts for status reporting.
    async fn stats(&self) -> Result<ArchiveStats, ArchivistError>;
}
