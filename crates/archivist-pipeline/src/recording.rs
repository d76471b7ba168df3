// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any installed recorder can collect these.

use archivist_core::types::MediaKind;
use metrics::describe_counter;

/// Register all Archivist metric descriptions.
///
/// Called once at startup.
pub fn register_metrics() {
    describe_counter!(
        "archivist_files_archived_total",
        "Files stored with both description and embedding"
    );
    describe_counter!(
        "archivist_files_incomplete_total",
        "Files left without an embedding after an ingest attempt"
    );
    describe_counter!("archivist_queries_total", "Search queries resolved");
    describe_counter!(
        "archivist_describe_retries_total",
        "Description provider calls retried"
    );
    describe_counter!(
        "archivist_embedding_failures_total",
        "Embedding batches rejected"
    );
}

/// Record a completed file.
pub fn record_archived(kind: MediaKind) {
    metrics::counter!("archivist_files_archived_total", "kind" => kind.as_str()).increment(1);
}

/// Record files left incomplete.
pub fn record_incomplete(count: usize) {
    metrics::counter!("archivist_files_incomplete_total").increment(count as u64);
}

/// Record a resolved query.
pub fn record_query(results: usize) {
    let outcome = if results == 0 { "empty" } else { "hit" };
    metrics::counter!("archivist_queries_total", "outcome" => outcome).increment(1);
}
