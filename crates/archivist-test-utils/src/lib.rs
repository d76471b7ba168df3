// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Archivist integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockDescriber`] - Description adapter that echoes media bytes
//! - [`MockEmbedder`] - Keyword-count embeddings with failure injection
//! - [`MockFetcher`] - In-memory media blobs keyed by file id
//! - [`TestHarness`] - Pipeline and resolver over a temp SQLite archive

pub mod harness;
pub mod mock_describer;
pub mod mock_embedder;
pub mod mock_fetcher;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_describer::MockDescriber;
pub use mock_embedder::MockEmbedder;
pub use mock_fetcher::MockFetcher;
