// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media fetcher trait: the one call the pipeline makes back into the transport.

use async_trait::async_trait;

use crate::error::ArchivistError;

/// Resolves an external file identifier to its raw bytes.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Downloads the media blob identified by `file_id`.
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, ArchivistError>;
}
