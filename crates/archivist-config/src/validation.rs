// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive limits, and well-formed provider URLs.

use crate::diagnostic::ConfigError;
use crate::model::ArchivistConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ArchivistConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(
            "agent.log_level",
            format!(
                "agent.log_level `{}` must be one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path",
            "storage.database_path must not be empty",
        ));
    }

    if config.ingest.max_file_size == 0 {
        errors.push(ConfigError::validation(
            "ingest.max_file_size",
            "ingest.max_file_size must be greater than 0",
        ));
    }

    if config.ingest.event_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "ingest.event_timeout_secs",
            "ingest.event_timeout_secs must be greater than 0",
        ));
    }

    if config.describe.video_frames == 0 {
        errors.push(ConfigError::validation(
            "describe.video_frames",
            "describe.video_frames must be at least 1",
        ));
    }

    if config.describe.model.trim().is_empty() {
        errors.push(ConfigError::validation(
            "describe.model",
            "describe.model must not be empty",
        ));
    }

    if config.embedding.dimensions == 0 {
        errors.push(ConfigError::validation(
            "embedding.dimensions",
            "embedding.dimensions must be greater than 0",
        ));
    }

    if config.embedding.model.trim().is_empty() {
        errors.push(ConfigError::validation(
            "embedding.model",
            "embedding.model must not be empty",
        ));
    }

    if config.search.k == 0 {
        errors.push(ConfigError::validation(
            "search.k",
            "search.k must be at least 1",
        ));
    }

    for (key, url) in [
        ("describe.base_url", &config.describe.base_url),
        ("embedding.host", &config.embedding.host),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(
                key,
                format!("{key} `{url}` must start with http:// or https://"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
