// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `archivist search` command implementation.
//!
//! Resolves a query the same way a private message to the bot would, and
//! prints the matches instead of forwarding them.

use std::sync::Arc;

use archivist_config::model::ArchivistConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::ArchiveStore;
use archivist_core::types::Message;
use archivist_embedding::OllamaEmbedder;
use archivist_pipeline::{QueryResolver, SearchMode};
use serde::Serialize;

use crate::serve::open_store;

/// One match in `--json` output.
#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    rank: usize,
    chat_id: i64,
    message_id: i64,
    link: Option<String>,
    archived_at: &'a str,
}

/// Run the `archivist search` command.
pub async fn run_search(
    config: &ArchivistConfig,
    query: &str,
    json: bool,
) -> Result<(), ArchivistError> {
    let store = open_store(&config.storage).await?;
    let embedder = Arc::new(OllamaEmbedder::new(&config.embedding)?);
    let resolver = QueryResolver::new(store.clone(), embedder, SearchMode::from(&config.search));

    let results = resolver.resolve(query).await;
    store.close().await?;
    let results = results?;

    if json {
        let hits: Vec<SearchHit<'_>> = results
            .iter()
            .enumerate()
            .map(|(i, m)| SearchHit {
                rank: i + 1,
                chat_id: m.chat_id,
                message_id: m.external_message_id,
                link: message_link(m.chat_id, m.external_message_id),
                archived_at: &m.created_at,
            })
            .collect();
        let out = serde_json::to_string_pretty(&hits)
            .map_err(|e| ArchivistError::Internal(format!("failed to encode results: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", archivist_telegram::NOTHING_FOUND);
        return Ok(());
    }
    for (i, message) in results.iter().enumerate() {
        println!("{}", format_hit(i + 1, message));
    }
    Ok(())
}

fn format_hit(rank: usize, message: &Message) -> String {
    match message_link(message.chat_id, message.external_message_id) {
        Some(link) => format!("{rank}. {link}"),
        None => format!(
            "{rank}. chat {} message {}",
            message.chat_id, message.external_message_id
        ),
    }
}

/// Public link to a message in a supergroup or channel.
///
/// Those chats have ids of the form `-100<internal id>`; basic groups have no
/// message links.
pub fn message_link(chat_id: i64, message_id: i64) -> Option<String> {
    let digits = chat_id.to_string();
    let internal = digits.strip_prefix("-100")?;
    if internal.is_empty() {
        return None;
    }
    Some(format!("https://t.me/c/{internal}/{message_id}"))
}
