// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::sync::Once;

use archivist_core::ArchivistError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Register sqlite-vec as an auto-extension so every connection opened by
/// this process gets `vec_distance_l2` and friends.
fn register_sqlite_vec() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite_vec::sqlite3_vec_init as *const (),
        )));
    });
}

/// Convert tokio-rusqlite errors to [`ArchivistError::StorageUnavailable`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ArchivistError {
    ArchivistError::storage(e)
}

/// Handle to the archive database.
///
/// Wraps the single `tokio_rusqlite::Connection`; cloning the inner
/// connection shares the same background thread.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(path: &str) -> Result<Self, ArchivistError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ArchivistError> {
        register_sqlite_vec();

        let conn = if path == ":memory:" {
            Connection::open_in_memory().await
        } else {
            if let Some(parent) = std::path::Path::new(path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(ArchivistError::storage)?;
            }
            Connection::open(path).await
        }
        .map_err(ArchivistError::storage)?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| crate::migrations::run_migrations(conn))
            .await
            .map_err(ArchivistError::storage)?;

        debug!(path, wal_mode, "archive database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ArchivistError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(ArchivistError::storage)
    }
}
