// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User operations.

use archivist_core::ArchivistError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::User;

/// Record a sender unless it is already known.
pub async fn upsert_user(db: &Database, user_id: i64, chat_id: i64) -> Result<(), ArchivistError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, chat_id) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO NOTHING",
                params![user_id, chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a user by external id.
pub async fn get_user(db: &Database, user_id: i64) -> Result<Option<User>, ArchivistError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT user_id, chat_id, joined_at FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                        chat_id: row.get(1)?,
                        joined_at: row.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
