// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Archivist media archive.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Archivist configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchivistConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Media intake and ingest settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Description provider settings.
    #[serde(default)]
    pub describe: DescribeConfig,

    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Query resolution settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "archivist".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables `archivist serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Reply to `/start`.
    #[serde(default = "default_welcome_text")]
    pub welcome_text: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            welcome_text: default_welcome_text(),
        }
    }
}

fn default_welcome_text() -> String {
    "Hello! Add me to a group and I will archive its photos and videos. \
     Message me privately to search the archive."
        .to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("archivist").join("archivist.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("archivist.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Media intake configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Attachments of this many bytes or more are dropped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Supervisory timeout for one inbound event, in seconds.
    #[serde(default = "default_event_timeout_secs")]
    pub event_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            event_timeout_secs: default_event_timeout_secs(),
        }
    }
}

fn default_max_file_size() -> u64 {
    20_000_000
}

fn default_event_timeout_secs() -> u64 {
    900
}

/// Multimodal description provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DescribeConfig {
    /// Provider API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat completions API.
    #[serde(default = "default_describe_base_url")]
    pub base_url: String,

    /// Vision-capable model identifier.
    #[serde(default = "default_describe_model")]
    pub model: String,

    /// Language descriptions are written in by default.
    #[serde(default = "default_language")]
    pub language: String,

    /// Fixed delay between retry attempts, in seconds.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Retry ceiling for transient (non-throttling) provider errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Keep retrying throttled requests until success or cancellation.
    #[serde(default = "default_retry_throttled_forever")]
    pub retry_throttled_forever: bool,

    /// Number of frames sampled from each video.
    #[serde(default = "default_video_frames")]
    pub video_frames: usize,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_describe_base_url(),
            model: default_describe_model(),
            language: default_language(),
            retry_backoff_secs: default_retry_backoff_secs(),
            max_retries: default_max_retries(),
            retry_throttled_forever: default_retry_throttled_forever(),
            video_frames: default_video_frames(),
        }
    }
}

fn default_describe_base_url() -> String {
    "https://api.mistral.ai".to_string()
}

fn default_describe_model() -> String {
    "pixtral-12b-2409".to_string()
}

fn default_language() -> String {
    "Russian".to_string()
}

fn default_retry_backoff_secs() -> u64 {
    2
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_throttled_forever() -> bool {
    true
}

fn default_video_frames() -> usize {
    8
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Ollama host URL.
    #[serde(default = "default_embedding_host")]
    pub host: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected vector dimensionality.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            host: default_embedding_host(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

fn default_embedding_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "snowflake-arctic-embed2".to_string()
}

fn default_dimensions() -> usize {
    1024
}

/// How many results a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Up to `search.k` distinct messages.
    Multi,
    /// Only the single closest message.
    MostSimilar,
}

/// Query resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default = "default_search_mode")]
    pub mode: SearchMode,

    /// Result count in `multi` mode.
    #[serde(default = "default_k")]
    pub k: usize,
}

impl SearchConfig {
    /// Number of neighbours to request for the configured mode.
    pub fn effective_k(&self) -> usize {
        match self.mode {
            SearchMode::Multi => self.k,
            SearchMode::MostSimilar => 1,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: default_search_mode(),
            k: default_k(),
        }
    }
}

fn default_search_mode() -> SearchMode {
    SearchMode::Multi
}

fn default_k() -> usize {
    3
}
