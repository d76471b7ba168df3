// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Archivist media archive.
//!
//! This crate provides the trait definitions, error type, and domain types
//! shared by the storage, provider, pipeline, and transport crates. Every
//! adapter implements a trait defined here so the pipeline can be wired with
//! real backends or test doubles.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ArchivistError;
pub use types::{AdapterType, HealthStatus, MediaKind};

pub use traits::{
    ArchiveStore, DescriptionAdapter, EmbeddingAdapter, MediaFetcher, PluginAdapter,
};
