// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `archivist status` command implementation.
//!
//! Reads archive counts straight from the database, so it works whether or
//! not the bot is running.

use archivist_config::model::ArchivistConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::ArchiveStore;
use archivist_core::types::ArchiveStats;
use serde::Serialize;

use crate::serve::open_store;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse<'a> {
    pub name: &'a str,
    pub database_path: &'a str,
    #[serde(flatten)]
    pub stats: ArchiveStats,
}

/// Run the `archivist status` command.
pub async fn run_status(config: &ArchivistConfig, json: bool) -> Result<(), ArchivistError> {
    let store = open_store(&config.storage).await?;
    let stats = store.stats().await;
    store.close().await?;
    let stats = stats?;

    if json {
        let response = StatusResponse {
            name: &config.agent.name,
            database_path: &config.storage.database_path,
            stats,
        };
        let out = serde_json::to_string_pretty(&response)
            .map_err(|e| ArchivistError::Internal(format!("failed to encode status: {e}")))?;
        println!("{out}");
    } else {
        print!("{}", format_stats(&config.agent.name, &config.storage.database_path, &stats));
    }
    Ok(())
}

fn format_stats(name: &str, database_path: &str, stats: &ArchiveStats) -> String {
    format!(
        "{name}\n  database:   {database_path}\n  chats:      {}\n  messages:   {}\n  files:      {}\n  incomplete: {}\n",
        stats.chats, stats.messages, stats.files, stats.incomplete_files
    )
}
