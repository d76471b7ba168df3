// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media download from Telegram servers.

use archivist_core::error::ArchivistError;
use archivist_core::traits::MediaFetcher;
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::debug;

/// [`MediaFetcher`] backed by the Bot API.
///
/// Uses `getFile` to resolve the file path, then downloads the content as
/// bytes. Bot API downloads are capped at 20 MB, which is why intake drops
/// larger attachments before they get here.
#[derive(Clone)]
pub struct TelegramFetcher {
    bot: Bot,
}

impl TelegramFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaFetcher for TelegramFetcher {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, ArchivistError> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| ArchivistError::Channel {
                message: format!("failed to get file info: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut buf = Vec::new();
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .map_err(|e| ArchivistError::Channel {
                message: format!("failed to download file: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(file_id, size = buf.len(), "downloaded file from Telegram");
        Ok(buf)
    }
}
