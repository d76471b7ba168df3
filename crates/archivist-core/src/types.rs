// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the adapter traits and the ingest/query pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Description,
    Embedding,
    Storage,
}

/// Chat type as reported by the transport.
///
/// Stored as its lowercase name; parse a stored value with `str::parse`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
            ChatKind::Supergroup => "supergroup",
            ChatKind::Channel => "channel",
        }
    }
}

/// Closed classification of archived media.
///
/// Produced once by the intake normalizer; everything downstream matches
/// on this tag instead of inspecting mime types again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// A chat the archive has observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// External chat identifier.
    pub chat_id: i64,
    pub kind: ChatKind,
    /// ISO 8601 timestamp of the first observed event.
    pub joined_at: String,
}

/// A user seen sending media to an archived chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    /// Chat the user was first seen in.
    pub chat_id: i64,
    pub joined_at: String,
}

/// One inbound media-bearing chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Generated unique token (UUID v4).
    pub id: String,
    pub chat_id: i64,
    pub sender_id: i64,
    /// Message identifier on the chat platform, used for forwarding.
    pub external_message_id: i64,
    pub created_at: String,
}

/// An archived media blob and its derived description and embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// External media identifier; the archive's dedup key.
    pub file_id: String,
    /// Owning [`Message::id`].
    pub message_id: String,
    pub media_kind: MediaKind,
    pub description: Option<String>,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    pub created_at: String,
}

impl File {
    /// A file is complete once both its description and embedding are stored.
    pub fn is_complete(&self) -> bool {
        self.description.is_some() && self.embedding.is_some()
    }
}

/// Loosely-typed kind hint attached to an inbound attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentKind {
    Photo,
    Video,
    Animation,
    Document { mime_type: Option<String> },
}

/// Attachment metadata delivered by the transport, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
    /// Size in bytes as reported by the transport.
    pub size: u64,
    pub kind: AttachmentKind,
}

/// A media-bearing chat event handed to the ingest pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMedia {
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub sender_id: i64,
    pub external_message_id: i64,
    pub attachments: Vec<Attachment>,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text in order.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// Row counts reported by the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveStats {
    pub chats: u64,
    pub messages: u64,
    pub files: u64,
    /// Files whose embedding has not been stored yet.
    pub incomplete_files: u64,
}
