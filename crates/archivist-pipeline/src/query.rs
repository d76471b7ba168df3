// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-text query resolution.

use std::sync::Arc;

use archivist_config::model::{SearchConfig, SearchMode as ConfiguredMode};
use archivist_core::error::ArchivistError;
use archivist_core::traits::{ArchiveStore, EmbeddingAdapter};
use archivist_core::types::{EmbeddingInput, Message};
use tracing::debug;

use crate::recording;

/// How many messages a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Up to `k` distinct messages, best first.
    Multi(usize),
    /// Only the single closest message.
    MostSimilar,
}

impl SearchMode {
    pub fn k(self) -> usize {
        match self {
            SearchMode::Multi(k) => k,
            SearchMode::MostSimilar => 1,
        }
    }
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Multi(3)
    }
}

impl From<&SearchConfig> for SearchMode {
    fn from(config: &SearchConfig) -> Self {
        match config.mode {
            ConfiguredMode::Multi => SearchMode::Multi(config.k),
            ConfiguredMode::MostSimilar => SearchMode::MostSimilar,
        }
    }
}

/// Embeds queries and looks up the nearest archived messages.
pub struct QueryResolver {
    store: Arc<dyn ArchiveStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    mode: SearchMode,
}

impl QueryResolver {
    pub fn new(
        store: Arc<dyn ArchiveStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        mode: SearchMode,
    ) -> Self {
        Self {
            store,
            embedder,
            mode,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Returns the messages whose files best match `text`, best first.
    ///
    /// A blank query returns nothing without calling the embedder.
    pub async fn resolve(&self, text: &str) -> Result<Vec<Message>, ArchivistError> {
        let query = text.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![query.to_string()],
            })
            .await?;
        let vector = output.embeddings.into_iter().next().ok_or_else(|| {
            ArchivistError::EmbeddingUnavailable {
                message: "embedder returned no vector for the query".into(),
                source: None,
            }
        })?;

        let messages = self.store.nearest_messages(&vector, self.mode.k()).await?;
        debug!(k = self.mode.k(), results = messages.len(), "query resolved");
        recording::record_query(messages.len());
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivist_config::model::StorageConfig;
    use archivist_core::types::{ChatKind, MediaKind};
    use archivist_storage::SqliteArchive;
    use archivist_test_utils::MockEmbedder;

    async fn store() -> Arc<SqliteArchive> {
        let store = Arc::new(SqliteArchive::new(StorageConfig {
            database_path: ":memory:".into(),
            wal_mode: false,
        }));
        store.initialize().await.unwrap();
        store
    }

    /// Archives one message with one completed file described by `text`.
    async fn archive(store: &SqliteArchive, embedder: &MockEmbedder, file_id: &str, text: &str) -> Message {
        store.get_or_create_chat(-1, ChatKind::Group).await.unwrap();
        let message = store.create_message(-1, 1, 1).await.unwrap();
        store
            .create_file(file_id, &message.id, MediaKind::Image)
            .await
            .unwrap();
        store
            .complete_file(file_id, text, &embedder.vector(text))
            .await
            .unwrap();
        message
    }

    #[test]
    fn mode_from_config() {
        let multi = SearchConfig {
            mode: ConfiguredMode::Multi,
            k: 5,
        };
        assert_eq!(SearchMode::from(&multi), SearchMode::Multi(5));
        let single = SearchConfig {
            mode: ConfiguredMode::MostSimilar,
            k: 5,
        };
        assert_eq!(SearchMode::from(&single).k(), 1);
        assert_eq!(SearchMode::default().k(), 3);
    }

    #[tokio::test]
    async fn empty_archive_resolves_to_nothing() {
        let resolver = QueryResolver::new(store().await, Arc::new(MockEmbedder::new()), SearchMode::default());
        assert!(resolver.resolve("bicycle").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_query_skips_the_embedder() {
        let embedder = Arc::new(MockEmbedder::new());
        let resolver = QueryResolver::new(store().await, embedder.clone(), SearchMode::default());
        assert!(resolver.resolve("   \n").await.unwrap().is_empty());
        assert_eq!(embedder.batches(), 0);
    }

    #[tokio::test]
    async fn closest_message_comes_first() {
        let store = store().await;
        let embedder = Arc::new(MockEmbedder::new());
        let cat = archive(&store, &embedder, "cat", "a cat on a sofa").await;
        let bike = archive(&store, &embedder, "bike", "a red bicycle").await;

        let resolver = QueryResolver::new(store.clone(), embedder.clone(), SearchMode::Multi(2));
        let results = resolver.resolve("bicycle").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, bike.id);
        assert_eq!(results[1].id, cat.id);

        let resolver = QueryResolver::new(store, embedder, SearchMode::MostSimilar);
        let results = resolver.resolve("cat").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, cat.id);
    }

    #[tokio::test]
    async fn embedder_failure_propagates() {
        let embedder = Arc::new(MockEmbedder::new());
        embedder.set_available(false);
        let resolver = QueryResolver::new(store().await, embedder, SearchMode::default());
        let err = resolver.resolve("cat").await.unwrap_err();
        assert!(matches!(err, ArchivistError::EmbeddingUnavailable { .. }));
    }
}
