// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File operations: insert-if-absent creation and the description/embedding
//! write path.

use archivist_core::ArchivistError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{blob_to_vec, parse_column, vec_to_blob, File, MediaKind};

const FILE_COLUMNS: &str = "file_id, message_id, media_kind, description, embedding, created_at";

fn row_to_file(row: &rusqlite::Row<'_>) -> Result<File, rusqlite::Error> {
    let embedding: Option<Vec<u8>> = row.get(4)?;
    Ok(File {
        file_id: row.get(0)?,
        message_id: row.get(1)?,
        media_kind: parse_column::<MediaKind>(row, 2)?,
        description: row.get(3)?,
        embedding: embedding.map(|blob| blob_to_vec(&blob)),
        created_at: row.get(5)?,
    })
}

fn not_found(file_id: &str) -> ArchivistError {
    ArchivistError::NotFound {
        entity: "file",
        id: file_id.to_string(),
    }
}

/// Returns true if a file with this external id is archived.
pub async fn file_exists(db: &Database, file_id: &str) -> Result<bool, ArchivistError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM files WHERE file_id = ?1)",
                params![file_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a file with no description or embedding.
///
/// A primary-key conflict inserts nothing and yields
/// [`ArchivistError::DuplicateFile`]; this is the only arbiter of concurrent
/// duplicate ingestion.
pub async fn create_file(
    db: &Database,
    file_id: &str,
    message_id: &str,
    kind: MediaKind,
) -> Result<File, ArchivistError> {
    let id = file_id.to_string();
    let message_id = message_id.to_string();
    let inserted = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO files (file_id, message_id, media_kind) VALUES (?1, ?2, ?3)
                     ON CONFLICT(file_id) DO NOTHING
                     RETURNING {FILE_COLUMNS}"
                ),
                params![id, message_id, kind.as_str()],
                row_to_file,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    inserted.ok_or_else(|| ArchivistError::DuplicateFile {
        file_id: file_id.to_string(),
    })
}

/// Fetch a file by external id.
pub async fn get_file(db: &Database, file_id: &str) -> Result<File, ArchivistError> {
    let lookup = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {FILE_COLUMNS} FROM files WHERE file_id = ?1"),
                params![lookup],
                row_to_file,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| not_found(file_id))
}

/// Set the description of an existing file.
pub async fn update_file_description(
    db: &Database,
    file_id: &str,
    description: &str,
) -> Result<(), ArchivistError> {
    let id = file_id.to_string();
    let description = description.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE files SET description = ?2 WHERE file_id = ?1",
                params![id, description],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(not_found(file_id));
    }
    Ok(())
}

/// Set the embedding of an existing file.
pub async fn update_file_embedding(
    db: &Database,
    file_id: &str,
    embedding: &[f32],
) -> Result<(), ArchivistError> {
    let id = file_id.to_string();
    let blob = vec_to_blob(embedding);
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE files SET embedding = ?2 WHERE file_id = ?1",
                params![id, blob],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(not_found(file_id));
    }
    Ok(())
}

/// Write description and embedding in a single transaction.
pub async fn complete_file(
    db: &Database,
    file_id: &str,
    description: &str,
    embedding: &[f32],
) -> Result<(), ArchivistError> {
    let id = file_id.to_string();
    let description = description.to_string();
    let blob = vec_to_blob(embedding);
    let updated = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE files SET description = ?2 WHERE file_id = ?1",
                params![id, description],
            )?;
            tx.execute(
                "UPDATE files SET embedding = ?2 WHERE file_id = ?1",
                params![id, blob],
            )?;
            tx.commit()?;
            Ok(updated)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(not_found(file_id));
    }
    Ok(())
}

/// Files whose embedding is still NULL, oldest first.
pub async fn incomplete_files(db: &Database, limit: usize) -> Result<Vec<File>, ArchivistError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FILE_COLUMNS} FROM files
                 WHERE embedding IS NULL
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_file)?;
            let mut files = Vec::new();
            for row in rows {
                files.push(row?);
            }
            Ok(files)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count all files and the incomplete subset.
pub async fn count_files(db: &Database) -> Result<(u64, u64), ArchivistError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*), COUNT(*) FILTER (WHERE embedding IS NULL) FROM files",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::queries::test_support::db_with_message;

    #[tokio::test]
    async fn create_file_starts_incomplete() {
        let (db, message_id) = db_with_message().await;

        let file = create_file(&db, "f1", &message_id, MediaKind::Video)
            .await
            .unwrap();
        assert_eq!(file.file_id, "f1");
        assert_eq!(file.message_id, message_id);
        assert_eq!(file.media_kind, MediaKind::Video);
        assert!(!file.is_complete());
        assert!(file_exists(&db, "f1").await.unwrap());
        assert!(!file_exists(&db, "f2").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_media_kind_is_a_storage_error() {
        let (db, message_id) = db_with_message().await;
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA ignore_check_constraints = ON;")?;
                conn.execute(
                    "INSERT INTO files (file_id, message_id, media_kind) VALUES ('bad', ?1, 'audio')",
                    params![message_id],
                )?;
                conn.execute_batch("PRAGMA ignore_check_constraints = OFF;")
            })
            .await
            .unwrap();

        let err = get_file(&db, "bad").await.unwrap_err();
        assert!(matches!(err, ArchivistError::StorageUnavailable { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn second_create_is_duplicate() {
        let (db, message_id) = db_with_message().await;

        create_file(&db, "f1", &message_id, MediaKind::Image)
            .await
            .unwrap();
        let err = create_file(&db, "f1", &message_id, MediaKind::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, ArchivistError::DuplicateFile { ref file_id } if file_id == "f1"));
    }

    #[tokio::test]
    async fn concurrent_creates_yield_one_row() {
        let (db, message_id) = db_with_message().await;
        let db = Arc::new(db);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            let message_id = message_id.clone();
            handles.push(tokio::spawn(async move {
                create_file(&db, "shared", &message_id, MediaKind::Image).await
            }));
        }

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(ArchivistError::DuplicateFile { .. }) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(duplicates, 9);
        assert_eq!(count_files(&db).await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn complete_file_writes_both_fields() {
        let (db, message_id) = db_with_message().await;
        create_file(&db, "f1", &message_id, MediaKind::Image)
            .await
            .unwrap();

        complete_file(&db, "f1", "a red bicycle", &[0.25, -1.0, 3.5])
            .await
            .unwrap();

        let file = get_file(&db, "f1").await.unwrap();
        assert_eq!(file.description.as_deref(), Some("a red bicycle"));
        assert_eq!(file.embedding, Some(vec![0.25, -1.0, 3.5]));
        assert!(file.is_complete());
    }

    #[tokio::test]
    async fn updates_on_missing_file_are_not_found() {
        let (db, _) = db_with_message().await;

        let err = update_file_description(&db, "ghost", "x").await.unwrap_err();
        assert!(matches!(err, ArchivistError::NotFound { entity: "file", .. }));
        let err = update_file_embedding(&db, "ghost", &[1.0]).await.unwrap_err();
        assert!(matches!(err, ArchivistError::NotFound { entity: "file", .. }));
        let err = complete_file(&db, "ghost", "x", &[1.0]).await.unwrap_err();
        assert!(matches!(err, ArchivistError::NotFound { entity: "file", .. }));
        let err = get_file(&db, "ghost").await.unwrap_err();
        assert!(matches!(err, ArchivistError::NotFound { entity: "file", .. }));
    }

    #[tokio::test]
    async fn incomplete_files_lists_oldest_unembedded_first() {
        let (db, message_id) = db_with_message().await;
        for id in ["a", "b", "c"] {
            create_file(&db, id, &message_id, MediaKind::Image)
                .await
                .unwrap();
        }
        // A description alone does not complete a file.
        update_file_description(&db, "a", "only text").await.unwrap();
        complete_file(&db, "b", "done", &[1.0]).await.unwrap();

        let pending = incomplete_files(&db, 10).await.unwrap();
        let ids: Vec<&str> = pending.iter().map(|f| f.file_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let limited = incomplete_files(&db, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].file_id, "a");
    }
}
