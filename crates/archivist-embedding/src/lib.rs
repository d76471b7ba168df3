// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text embedding for the Archivist media archive.
//!
//! Descriptions and search queries are embedded by the same model so they
//! live in one vector space; see [`OllamaEmbedder`].

pub mod ollama;

pub use ollama::OllamaEmbedder;
