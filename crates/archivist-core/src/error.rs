// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Archivist media archive.

use thiserror::Error;

/// Boxed error source carried by adapter-boundary variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Archivist adapter traits and pipeline stages.
#[derive(Debug, Error)]
pub enum ArchivistError {
    /// A file with this external identifier is already archived.
    ///
    /// Expected under duplicate or concurrent ingestion; callers skip the file.
    #[error("file already archived: {file_id}")]
    DuplicateFile { file_id: String },

    /// The description provider could not produce a description.
    #[error("description unavailable: {message}")]
    DescriptionUnavailable {
        message: String,
        source: Option<BoxError>,
    },

    /// The embedding provider failed for the whole batch.
    #[error("embedding unavailable: {message}")]
    EmbeddingUnavailable {
        message: String,
        source: Option<BoxError>,
    },

    /// Storage backend errors (connection, query failure, transaction abort).
    #[error("storage unavailable: {source}")]
    StorageUnavailable { source: BoxError },

    /// A row looked up by identifier does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The operation was aborted through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat transport errors (download failure, reaction, forwarding).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<BoxError>,
    },

    /// Low-level provider errors (HTTP failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<BoxError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ArchivistError {
    /// Shorthand for a `StorageUnavailable` built from any error.
    pub fn storage(source: impl Into<BoxError>) -> Self {
        ArchivistError::StorageUnavailable {
            source: source.into(),
        }
    }

    /// Returns true for errors that leave the archive consistent and only
    /// affect the current file or batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ArchivistError::DuplicateFile { .. }
                | ArchivistError::DescriptionUnavailable { .. }
                | ArchivistError::EmbeddingUnavailable { .. }
        )
    }
}
