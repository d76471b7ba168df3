// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! L2 nearest-neighbour lookup over file embeddings using sqlite-vec.

use archivist_core::ArchivistError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{vec_to_blob, Message};
use crate::queries::messages::row_to_message;

/// Distinct messages ordered by their closest file embedding, at most `k`.
///
/// Files without an embedding, or with an embedding of a different
/// dimensionality than `query`, are skipped.
pub async fn nearest_messages(
    db: &Database,
    query: &[f32],
    k: usize,
) -> Result<Vec<Message>, ArchivistError> {
    if k == 0 || query.is_empty() {
        return Ok(Vec::new());
    }
    let blob = vec_to_blob(query);
    let limit = i64::try_from(k).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.chat_id, m.sender_id, m.external_message_id, m.created_at,
                        MIN(vec_distance_l2(f.embedding, ?1)) AS distance
                 FROM files f
                 JOIN messages m ON m.id = f.message_id
                 WHERE f.embedding IS NOT NULL
                   AND length(f.embedding) = length(?1)
                 GROUP BY m.id
                 ORDER BY distance ASC, m.created_at ASC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![blob, limit], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
