// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message classification and attachment extraction.
//!
//! Decides what an incoming Telegram message is (a command, a search query,
//! or media to archive) and converts media messages into channel-agnostic
//! [`InboundMedia`] events.

use archivist_core::types::{Attachment, AttachmentKind, ChatKind, InboundMedia};
use teloxide::types::{Chat, Message};
use tracing::warn;

/// Maps a Telegram chat onto the archive's chat kinds.
pub fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Group
    }
}

/// Checks whether the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    msg.chat.is_private()
}

/// True for `/start` and `/start@botname`.
pub fn is_start_command(msg: &Message) -> bool {
    msg.text()
        .and_then(|text| text.split_whitespace().next())
        .is_some_and(|cmd| cmd == "/start" || cmd.starts_with("/start@"))
}

/// Text of a private message to treat as a search query.
///
/// Commands are not queries.
pub fn query_text(msg: &Message) -> Option<&str> {
    if !is_dm(msg) {
        return None;
    }
    msg.text()
        .map(str::trim)
        .filter(|text| !text.is_empty() && !text.starts_with('/'))
}

/// Attachments carried by a message.
///
/// Every photo size is its own attachment; each has a distinct file id.
pub fn attachments(msg: &Message) -> Vec<Attachment> {
    let mut out = Vec::new();

    if let Some(photos) = msg.photo() {
        out.extend(photos.iter().map(|p| Attachment {
            file_id: p.file.id.to_string(),
            size: u64::from(p.file.size),
            kind: AttachmentKind::Photo,
        }));
    }
    if let Some(video) = msg.video() {
        out.push(Attachment {
            file_id: video.file.id.to_string(),
            size: u64::from(video.file.size),
            kind: AttachmentKind::Video,
        });
    }
    if let Some(animation) = msg.animation() {
        out.push(Attachment {
            file_id: animation.file.id.to_string(),
            size: u64::from(animation.file.size),
            kind: AttachmentKind::Animation,
        });
    }
    if let Some(doc) = msg.document() {
        out.push(Attachment {
            file_id: doc.file.id.to_string(),
            size: u64::from(doc.file.size),
            kind: AttachmentKind::Document {
                mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
            },
        });
    }

    out
}

/// Sender id for the archive: the user, else the chat posting on its
/// behalf, else the chat itself (anonymous channel posts).
///
/// A user id outside the `i64` range is treated as absent.
pub fn sender_id(msg: &Message) -> i64 {
    if let Some(user) = msg.from.as_ref() {
        match i64::try_from(user.id.0) {
            Ok(id) => return id,
            Err(_) => warn!(user_id = user.id.0, "user id out of range, using chat as sender"),
        }
    }
    msg.sender_chat
        .as_ref()
        .map(|chat| chat.id.0)
        .unwrap_or(msg.chat.id.0)
}

/// Converts a non-private media message into an [`InboundMedia`] event.
///
/// Returns `None` for private chats and messages without attachments.
pub fn to_inbound_media(msg: &Message) -> Option<InboundMedia> {
    if is_dm(msg) {
        return None;
    }
    let attachments = attachments(msg);
    if attachments.is_empty() {
        return None;
    }

    Some(InboundMedia {
        chat_id: msg.chat.id.0,
        chat_kind: chat_kind(&msg.chat),
        sender_id: sender_id(msg),
        external_message_id: i64::from(msg.id.0),
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> serde_json::Value {
        json!({"id": 777, "is_bot": false, "first_name": "Test"})
    }

    fn supergroup() -> serde_json::Value {
        json!({"id": -100123i64, "type": "supergroup", "title": "Archive"})
    }

    fn message(fields: serde_json::Value) -> Message {
        let mut base = json!({
            "message_id": 42,
            "date": 1700000000i64,
            "chat": supergroup(),
            "from": user(),
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), fields.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).expect("failed to deserialize mock message")
    }

    fn private_text(text: &str) -> Message {
        message(json!({
            "chat": {"id": 777, "type": "private", "first_name": "Test"},
            "text": text,
        }))
    }

    #[test]
    fn photo_sizes_are_separate_attachments() {
        let msg = message(json!({
            "photo": [
                {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 60, "file_size": 1200},
                {"file_id": "large", "file_unique_id": "l", "width": 1280, "height": 853, "file_size": 150000}
            ]
        }));

        let event = to_inbound_media(&msg).unwrap();
        assert_eq!(event.chat_id, -100123);
        assert_eq!(event.chat_kind, ChatKind::Supergroup);
        assert_eq!(event.sender_id, 777);
        assert_eq!(event.external_message_id, 42);
        let ids: Vec<_> = event.attachments.iter().map(|a| a.file_id.as_str()).collect();
        assert_eq!(ids, ["small", "large"]);
        assert_eq!(event.attachments[1].size, 150000);
        assert!(event.attachments.iter().all(|a| a.kind == AttachmentKind::Photo));
    }

    #[test]
    fn video_attachment() {
        let msg = message(json!({
            "video": {
                "file_id": "vid", "file_unique_id": "v", "width": 640, "height": 480,
                "duration": 12, "mime_type": "video/mp4", "file_size": 2500000
            }
        }));
        let attachments = attachments(&msg);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].kind, AttachmentKind::Video);
        assert_eq!(attachments[0].size, 2_500_000);
    }

    #[test]
    fn document_keeps_mime_type() {
        let msg = message(json!({
            "document": {
                "file_id": "doc", "file_unique_id": "d", "file_name": "scan.png",
                "mime_type": "image/png", "file_size": 4096
            }
        }));
        let attachments = attachments(&msg);
        assert_eq!(
            attachments[0].kind,
            AttachmentKind::Document {
                mime_type: Some("image/png".into())
            }
        );
    }

    #[test]
    fn text_in_group_is_not_media() {
        let msg = message(json!({"text": "hello"}));
        assert!(to_inbound_media(&msg).is_none());
        assert!(query_text(&msg).is_none());
    }

    #[test]
    fn private_text_is_a_query() {
        assert_eq!(query_text(&private_text("  red bicycle ")), Some("red bicycle"));
        assert!(query_text(&private_text("/start")).is_none());
        assert!(is_dm(&private_text("x")));
    }

    #[test]
    fn start_command_variants() {
        assert!(is_start_command(&private_text("/start")));
        assert!(is_start_command(&private_text("/start@archivist_bot")));
        assert!(!is_start_command(&private_text("/stats")));
        assert!(!is_start_command(&private_text("start")));
    }

    #[test]
    fn private_media_is_not_archived() {
        let msg = message(json!({
            "chat": {"id": 777, "type": "private", "first_name": "Test"},
            "photo": [{"file_id": "p", "file_unique_id": "p", "width": 1, "height": 1, "file_size": 1}]
        }));
        assert!(to_inbound_media(&msg).is_none());
    }

    #[test]
    fn channel_post_without_sender_uses_chat_id() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 3,
            "date": 1700000000i64,
            "chat": {"id": -100555i64, "type": "channel", "title": "News"},
            "sender_chat": {"id": -100555i64, "type": "channel", "title": "News"},
            "photo": [{"file_id": "p", "file_unique_id": "p", "width": 1, "height": 1, "file_size": 1}]
        }))
        .expect("failed to deserialize channel post");

        let event = to_inbound_media(&msg).unwrap();
        assert_eq!(event.chat_kind, ChatKind::Channel);
        assert_eq!(event.sender_id, -100555);
    }

    #[test]
    fn out_of_range_user_id_falls_back_to_chat() {
        let msg = message(json!({
            "from": {"id": u64::MAX, "is_bot": false, "first_name": "Huge"},
            "photo": [{"file_id": "p", "file_unique_id": "p", "width": 1, "height": 1, "file_size": 1}]
        }));
        assert_eq!(sender_id(&msg), -100123);
    }
}
