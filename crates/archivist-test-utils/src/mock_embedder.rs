// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter with deterministic keyword vectors.
//!
//! Each vocabulary word owns one dimension holding its occurrence count in
//! the text; a final constant dimension keeps every vector non-zero. Texts
//! sharing a keyword are therefore closer in L2 than texts that do not.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use archivist_core::traits::{EmbeddingAdapter, PluginAdapter};
use archivist_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use archivist_core::ArchivistError;

/// Words recognised by [`MockEmbedder::new`].
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "bicycle", "cat", "dog", "car", "sunset", "beach", "meme", "cake", "red", "blue",
];

pub struct MockEmbedder {
    vocabulary: Vec<String>,
    available: AtomicBool,
    batches: AtomicUsize,
}

impl MockEmbedder {
    /// Embedder over [`DEFAULT_VOCABULARY`].
    pub fn new() -> Self {
        Self::with_vocabulary(DEFAULT_VOCABULARY)
    }

    pub fn with_vocabulary(words: &[&str]) -> Self {
        Self {
            vocabulary: words.iter().map(|w| w.to_lowercase()).collect(),
            available: AtomicBool::new(true),
            batches: AtomicUsize::new(0),
        }
    }

    /// Vector width: one per vocabulary word plus the constant dimension.
    pub fn dimensions(&self) -> usize {
        self.vocabulary.len() + 1
    }

    /// When false, every batch fails with `EmbeddingUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of `embed` calls that reached the embedder.
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// The vector this embedder produces for `text`.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions()];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if let Some(i) = self.vocabulary.iter().position(|v| *v == word) {
                vector[i] += 1.0;
            }
        }
        if let Some(last) = vector.last_mut() {
            *last = 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ArchivistError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("mock embedder offline".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), ArchivistError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ArchivistError> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(ArchivistError::EmbeddingUnavailable {
                message: "mock embedder offline".into(),
                source: None,
            });
        }

        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector(t)).collect(),
            dimensions: self.dimensions(),
        })
    }
}
