// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for the Archivist media archive.
//!
//! Runs a teloxide long-polling dispatcher that archives media posted in
//! groups and channels, and answers private text messages with the archived
//! messages that best match them.

pub mod handler;
pub mod media;

use std::sync::Arc;

use archivist_config::model::TelegramConfig;
use archivist_core::error::ArchivistError;
use archivist_core::traits::PluginAdapter;
use archivist_core::types::{AdapterType, HealthStatus};
use archivist_pipeline::{Ingestor, QueryResolver};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, MessageId, ReactionType};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub use media::TelegramFetcher;

/// Reply sent when a query matches nothing.
pub const NOTHING_FOUND: &str = "Nothing found.";

/// Reaction placed on a message once its media is archived.
pub const ARCHIVED_REACTION: &str = "✍️";

/// Shared state injected into every update handler.
struct BotState {
    ingestor: Arc<Ingestor>,
    resolver: Arc<QueryResolver>,
    fetcher: TelegramFetcher,
    welcome_text: String,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

/// Telegram bot wiring the dispatcher to the pipeline.
pub struct TelegramBot {
    bot: Bot,
    config: TelegramConfig,
}

impl TelegramBot {
    /// Creates a new Telegram bot.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, ArchivistError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ArchivistError::Config("telegram.bot_token is required to run the bot".into())
        })?;

        if token.is_empty() {
            return Err(ArchivistError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        Ok(Self { bot, config })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Fetcher downloading media through this bot.
    pub fn fetcher(&self) -> TelegramFetcher {
        TelegramFetcher::new(self.bot.clone())
    }

    /// Polls for updates until `cancel` fires.
    ///
    /// Ingests run on tasks tracked by `tracker` so the caller can drain them
    /// after this returns.
    pub async fn run(
        &self,
        ingestor: Arc<Ingestor>,
        resolver: Arc<QueryResolver>,
        cancel: CancellationToken,
        tracker: TaskTracker,
    ) {
        let state = Arc::new(BotState {
            ingestor,
            resolver,
            fetcher: self.fetcher(),
            welcome_text: self.config.welcome_text.clone(),
            cancel: cancel.clone(),
            tracker,
        });

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_channel_post().endpoint(on_message))
            .branch(Update::filter_my_chat_member().endpoint(on_membership));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![state])
            .default_handler(|_| async {}) // Silently ignore other updates
            .build();

        let shutdown = dispatcher.shutdown_token();
        tokio::spawn(async move {
            cancel.cancelled().await;
            match shutdown.shutdown() {
                Ok(stopped) => stopped.await,
                Err(e) => debug!(error = %e, "dispatcher already idle"),
            }
        });

        info!("starting Telegram long polling");
        dispatcher.dispatch().await;
        info!("Telegram dispatcher stopped");
    }
}

async fn on_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if handler::is_start_command(&msg) {
        if let Err(e) = bot.send_message(msg.chat.id, &state.welcome_text).await {
            warn!(chat_id = msg.chat.id.0, error = %e, "failed to send welcome text");
        }
        return Ok(());
    }

    if let Some(query) = handler::query_text(&msg) {
        answer_query(&bot, &msg, query, &state).await;
        return Ok(());
    }

    let Some(event) = handler::to_inbound_media(&msg) else {
        debug!(chat_id = msg.chat.id.0, msg_id = msg.id.0, "ignoring message without media");
        return Ok(());
    };

    let chat_id = msg.chat.id;
    let message_id = msg.id;
    let task_state = state.clone();
    state.tracker.spawn(async move {
        let state = task_state;
        match state
            .ingestor
            .ingest(&event, &state.fetcher, &state.cancel)
            .await
        {
            Ok(report) if report.archived > 0 => react(&bot, chat_id, message_id).await,
            Ok(_) => {}
            Err(ArchivistError::Cancelled) => {
                warn!(chat_id = chat_id.0, msg_id = message_id.0, "ingest cancelled");
            }
            Err(e) => {
                error!(chat_id = chat_id.0, msg_id = message_id.0, error = %e, "ingest failed");
            }
        }
    });

    Ok(())
}

async fn react(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    let reaction = ReactionType::Emoji {
        emoji: ARCHIVED_REACTION.to_string(),
    };
    if let Err(e) = bot
        .set_message_reaction(chat_id, message_id)
        .reaction(vec![reaction])
        .await
    {
        warn!(chat_id = chat_id.0, error = %e, "failed to acknowledge archived message");
    }
}

async fn answer_query(bot: &Bot, msg: &Message, query: &str, state: &BotState) {
    let results = match state.resolver.resolve(query).await {
        Ok(results) => results,
        Err(e) => {
            error!(chat_id = msg.chat.id.0, error = %e, "query failed");
            return;
        }
    };

    if results.is_empty() {
        if let Err(e) = bot.send_message(msg.chat.id, NOTHING_FOUND).await {
            warn!(error = %e, "failed to send empty-result reply");
        }
        return;
    }

    for found in results {
        let Ok(external_id) = i32::try_from(found.external_message_id) else {
            warn!(message_id = %found.id, "stored message id out of range, skipping");
            continue;
        };
        if let Err(e) = bot
            .forward_message(msg.chat.id, ChatId(found.chat_id), MessageId(external_id))
            .await
        {
            warn!(
                source_chat = found.chat_id,
                msg_id = external_id,
                error = %e,
                "failed to forward archived message"
            );
        }
    }
}

async fn on_membership(update: ChatMemberUpdated, state: Arc<BotState>) -> ResponseResult<()> {
    let kind = handler::chat_kind(&update.chat);
    match state
        .ingestor
        .store()
        .get_or_create_chat(update.chat.id.0, kind)
        .await
    {
        Ok(chat) => info!(chat_id = chat.chat_id, kind = kind.as_str(), "chat membership updated"),
        Err(e) => error!(chat_id = update.chat.id.0, error = %e, "failed to record chat"),
    }
    Ok(())
}

#[async_trait]
impl PluginAdapter for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ArchivistError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ArchivistError> {
        debug!("Telegram bot shutting down");
        Ok(())
    }
}
