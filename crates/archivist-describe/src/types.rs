// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response types for the chat completions API.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A chat completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages, system instruction first.
    pub messages: Vec<ChatMessage>,
}

/// A single message in the request conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role: "system" or "user".
    pub role: String,
    pub content: ChatContent,
}

impl ChatMessage {
    /// Plain-text system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: ChatContent::Text(text.into()),
        }
    }

    /// Multimodal user message.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".into(),
            content: ChatContent::Parts(parts),
        }
    }
}

/// Message content: a bare string or a list of typed parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A typed content part of a multimodal message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    /// Inline image as a `data:` URL.
    #[serde(rename = "image_url")]
    ImageUrl { image_url: String },
}

impl ContentPart {
    /// Wraps JPEG bytes as a base64 `data:image/jpeg` URL part.
    pub fn jpeg(bytes: &[u8]) -> Self {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        ContentPart::ImageUrl {
            image_url: format!("data:image/jpeg;base64,{encoded}"),
        }
    }
}

// --- Response types ---

/// A chat completions response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub message: serde_json::Value,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}

impl ApiErrorResponse {
    /// Human-readable message, flattening structured validation errors.
    pub fn message_text(&self) -> String {
        match &self.message {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
