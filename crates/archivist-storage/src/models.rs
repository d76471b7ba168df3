// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities, plus the embedding BLOB codec.
//!
//! The canonical types are defined in `archivist-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

use std::str::FromStr;

pub use archivist_core::types::{ArchiveStats, Chat, ChatKind, File, MediaKind, Message, User};

/// Read a text column holding an enum's stored name.
///
/// An unknown value is a conversion error, not a default.
pub fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Serialize an f32 vector into a little-endian byte BLOB.
///
/// This is the layout sqlite-vec reads as a `float[N]` vector.
pub fn vec_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize a little-endian byte BLOB back into an f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
