// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingest-and-retrieve pipeline for the Archivist media archive.
//!
//! - [`intake`] turns raw attachments into deduplicated candidates
//! - [`Ingestor`] describes, embeds and persists the media of one event
//! - [`QueryResolver`] maps a text query to the nearest archived messages
//! - [`shutdown`] wires process signals to a cancellation token
//!
//! Every collaborator is injected as an `Arc<dyn Trait>` so the pipeline runs
//! unchanged against real providers or test doubles.

pub mod ingest;
pub mod intake;
pub mod query;
pub mod recording;
pub mod shutdown;

pub use ingest::{IngestReport, Ingestor, ReprocessReport};
pub use intake::{Candidate, IntakeConfig};
pub use query::{QueryResolver, SearchMode};
