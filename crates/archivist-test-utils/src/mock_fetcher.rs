// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory media fetcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use archivist_core::traits::MediaFetcher;
use archivist_core::ArchivistError;

/// Serves media blobs registered with [`MockFetcher::insert`]. Unknown ids
/// fail with a channel error, like an expired platform file.
#[derive(Default)]
pub struct MockFetcher {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, file_id: &str, data: impl Into<Vec<u8>>) {
        self.blobs.write().await.insert(file_id.to_string(), data.into());
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, ArchivistError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .read()
            .await
            .get(file_id)
            .cloned()
            .ok_or_else(|| ArchivistError::Channel {
                message: format!("no such file: {file_id}"),
                source: None,
            })
    }
}
