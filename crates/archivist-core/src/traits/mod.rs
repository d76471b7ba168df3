// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod description;
pub mod embedding;
pub mod fetcher;
pub mod storage;

pub use adapter::PluginAdapter;
pub use description::DescriptionAdapter;
pub use embedding::EmbeddingAdapter;
pub use fetcher::MediaFetcher;
pub use storage::ArchiveStore;
