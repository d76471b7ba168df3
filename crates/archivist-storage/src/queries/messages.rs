// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations.

use archivist_core::ArchivistError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::Message;

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, chat_id, sender_id, external_message_id, created_at";

pub(crate) fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        sender_id: row.get(2)?,
        external_message_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Insert a new message with a freshly generated id. Never deduplicates.
pub async fn create_message(
    db: &Database,
    chat_id: i64,
    sender_id: i64,
    external_message_id: i64,
) -> Result<Message, ArchivistError> {
    let id = uuid::Uuid::new_v4().to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO messages (id, chat_id, sender_id, external_message_id)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                params![id, chat_id, sender_id, external_message_id],
                row_to_message,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a message by its generated id.
pub async fn get_message(db: &Database, id: &str) -> Result<Message, ArchivistError> {
    let id = id.to_string();
    let lookup = id.clone();
    let found = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![lookup],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    found.ok_or(ArchivistError::NotFound {
        entity: "message",
        id,
    })
}

/// Count archived messages.
pub async fn count_messages(db: &Database) -> Result<u64, ArchivistError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)
}
