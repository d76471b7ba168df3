// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `archivist serve` and `archivist reprocess` command implementations.
//!
//! Opens the archive, builds the description and embedding providers, and
//! either runs the Telegram bot until a shutdown signal arrives or sweeps
//! incomplete files once.

use std::sync::Arc;
use std::time::Duration;

use archivist_config::model::{ArchivistConfig, StorageConfig};
use archivist_core::error::ArchivistError;
use archivist_core::traits::{ArchiveStore, PluginAdapter};
use archivist_core::types::HealthStatus;
use archivist_describe::MediaDescriber;
use archivist_embedding::OllamaEmbedder;
use archivist_pipeline::recording::register_metrics;
use archivist_pipeline::shutdown::{drain_tasks, install_signal_handler};
use archivist_pipeline::{Ingestor, QueryResolver, SearchMode};
use archivist_storage::SqliteArchive;
use archivist_telegram::TelegramBot;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

/// Time granted to in-flight ingests after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the `archivist serve` command.
pub async fn run_serve(config: ArchivistConfig) -> Result<(), ArchivistError> {
    info!(name = %config.agent.name, "starting archivist serve");
    register_metrics();

    let store = open_store(&config.storage).await?;
    let describer = Arc::new(MediaDescriber::new(&config.describe)?);
    let embedder = Arc::new(OllamaEmbedder::new(&config.embedding)?);
    report_health(embedder.as_ref()).await;

    let bot = TelegramBot::new(config.telegram.clone())?;
    report_health(&bot).await;

    let ingestor = Arc::new(Ingestor::new(
        store.clone(),
        describer,
        embedder.clone(),
        &config.ingest,
    ));
    let resolver = Arc::new(QueryResolver::new(
        store.clone(),
        embedder,
        SearchMode::from(&config.search),
    ));

    let cancel = install_signal_handler();
    let tracker = TaskTracker::new();

    bot.run(ingestor, resolver, cancel, tracker.clone()).await;

    drain_tasks(&tracker, DRAIN_TIMEOUT).await;
    store.close().await?;

    info!("archivist serve shutdown complete");
    Ok(())
}

/// Runs the `archivist reprocess` command.
///
/// Incomplete files are fetched again through the bot, so a token is required.
pub async fn run_reprocess(config: ArchivistConfig, limit: usize) -> Result<(), ArchivistError> {
    let store = open_store(&config.storage).await?;
    let describer = Arc::new(MediaDescriber::new(&config.describe)?);
    let embedder = Arc::new(OllamaEmbedder::new(&config.embedding)?);
    let bot = TelegramBot::new(config.telegram.clone())?;

    let ingestor = Ingestor::new(store.clone(), describer, embedder, &config.ingest);
    let cancel = install_signal_handler();

    let result = ingestor.reprocess(limit, &bot.fetcher(), &cancel).await;
    store.close().await?;
    let report = result?;

    println!(
        "reprocessed {} file(s): {} archived, {} still incomplete",
        report.attempted, report.archived, report.incomplete
    );
    Ok(())
}

/// Opens and migrates the archive database.
pub(crate) async fn open_store(
    config: &StorageConfig,
) -> Result<Arc<SqliteArchive>, ArchivistError> {
    let store = SqliteArchive::new(config.clone());
    store.initialize().await?;
    Ok(Arc::new(store))
}

/// Logs the adapter's health without failing startup.
async fn report_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), %reason, "adapter not healthy at startup")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("archivist={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
