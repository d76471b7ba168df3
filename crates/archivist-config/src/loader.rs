// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./archivist.toml` > `~/.config/archivist/archivist.toml`
//! > `/etc/archivist/archivist.toml` with environment variable overrides via the
//! `ARCHIVIST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ArchivistConfig;

/// Section names recognised in `ARCHIVIST_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "telegram",
    "storage",
    "ingest",
    "describe",
    "embedding",
    "search",
];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/archivist/archivist.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "archivist.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("archivist/archivist.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/archivist/archivist.toml` (system-wide)
/// 3. `~/.config/archivist/archivist.toml` (user XDG config)
/// 4. `./archivist.toml` (local directory)
/// 5. `ARCHIVIST_*` environment variables
pub fn load_config() -> Result<ArchivistConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ArchivistConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ArchivistConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ArchivistConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ArchivistConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ArchivistConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `ARCHIVIST_DESCRIBE_MAX_RETRIES` must map to
/// `describe.max_retries`, not `describe.max.retries`.
fn env_provider() -> Env {
    Env::prefixed("ARCHIVIST_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("describe_max_retries"), "describe.max_retries");
        assert_eq!(
            map_env_key("describe_retry_throttled_forever"),
            "describe.retry_throttled_forever"
        );
        assert_eq!(map_env_key("search_k"), "search.k");
    }

    #[test]
    fn unknown_section_is_left_untouched() {
        assert_eq!(map_env_key("logging_level"), "logging_level");
    }
}
