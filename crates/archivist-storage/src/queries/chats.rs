// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat operations.

use archivist_core::ArchivistError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{parse_column, Chat, ChatKind};

/// Return the chat row, inserting it first if absent.
///
/// The insert is `ON CONFLICT DO NOTHING`, so concurrent callers converge on
/// the first writer's row and `kind` of later callers is ignored.
pub async fn get_or_create_chat(
    db: &Database,
    chat_id: i64,
    kind: ChatKind,
) -> Result<Chat, ArchivistError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chats (chat_id, kind) VALUES (?1, ?2)
                 ON CONFLICT(chat_id) DO NOTHING",
                params![chat_id, kind.as_str()],
            )?;
            conn.query_row(
                "SELECT chat_id, kind, joined_at FROM chats WHERE chat_id = ?1",
                params![chat_id],
                |row| {
                    Ok(Chat {
                        chat_id: row.get(0)?,
                        kind: parse_column(row, 1)?,
                        joined_at: row.get(2)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count archived chats.
pub async fn count_chats(db: &Database) -> Result<u64, ArchivistError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)
}
