// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Turns figment failures and validation failures into miette reports that
//! point at the offending line of `archivist.toml`, with "did you mean?"
//! suggestions drawn from the section key tables below.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches typos like `dimensoins` -> `dimensions` and `modle` -> `model`.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Keys accepted in each section of `archivist.toml`.
pub const SECTION_KEYS: &[(&str, &[&str])] = &[
    ("agent", &["name", "log_level"]),
    ("telegram", &["bot_token", "welcome_text"]),
    ("storage", &["database_path", "wal_mode"]),
    ("ingest", &["max_file_size", "event_timeout_secs"]),
    (
        "describe",
        &[
            "api_key",
            "base_url",
            "model",
            "language",
            "retry_backoff_secs",
            "max_retries",
            "retry_throttled_forever",
            "video_frames",
        ],
    ),
    ("embedding", &["host", "model", "dimensions"]),
    ("search", &["mode", "k"]),
];

/// A configuration source: display name and full TOML text.
pub type TomlSource = (String, String);

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key or section that no part of the configuration accepts.
    #[error("unknown configuration key `{}`", dotted(.section, .key))]
    #[diagnostic(
        code(archivist::config::unknown_key),
        help("{}", unknown_key_help(section, key, suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Section the key appeared in; empty at the top level.
        section: String,
        key: String,
        /// Closest valid key in the same section, if any.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, such as `k = "three"`.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(archivist::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted key path, e.g. `search.k`.
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but breaks a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(archivist::config::validation))]
    Validation {
        /// Dotted key path, e.g. `ingest.max_file_size`.
        key: String,
        message: String,
        #[label("set here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(archivist::config::other))]
    Other(String),
}

impl ConfigError {
    /// A validation failure for `key`, without a source location yet.
    pub fn validation(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            key: key.to_string(),
            message: message.into(),
            span: None,
            src: None,
        }
    }

    /// Dotted path of the key this error is about, if it names one.
    pub fn key(&self) -> Option<String> {
        match self {
            ConfigError::UnknownKey { section, key, .. } => Some(dotted(section, key)),
            ConfigError::InvalidType { key, .. } | ConfigError::Validation { key, .. } => {
                Some(key.clone())
            }
            ConfigError::Other(_) => None,
        }
    }
}

fn dotted(section: &str, key: &str) -> String {
    if section.is_empty() {
        key.to_string()
    } else {
        format!("{section}.{key}")
    }
}

fn unknown_key_help(
    section: &str,
    key: &str,
    suggestion: Option<&str>,
    valid_keys: &str,
) -> String {
    if let Some(s) = suggestion {
        return format!("did you mean `{s}`? Valid keys: {valid_keys}");
    }
    match home_section(key) {
        Some(home) if home != section => format!("`{key}` belongs in the [{home}] section"),
        _ => format!("valid keys: {valid_keys}"),
    }
}

/// Section that owns `key`, when exactly one does.
pub fn home_section(key: &str) -> Option<&'static str> {
    let mut owners = SECTION_KEYS
        .iter()
        .filter(|(_, keys)| keys.contains(&key))
        .map(|(section, _)| *section);
    let first = owners.next()?;
    owners.next().is_none().then_some(first)
}

/// Keys accepted in `section`; the section names themselves at the top level.
pub fn keys_for(section: &str) -> Vec<&'static str> {
    if section.is_empty() {
        return SECTION_KEYS.iter().map(|(name, _)| *name).collect();
    }
    SECTION_KEYS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| keys.to_vec())
        .unwrap_or_default()
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
pub fn figment_to_config_errors(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
            match &error.kind {
                Kind::UnknownField(field, _) => {
                    let section = path.first().cloned().unwrap_or_default();
                    let valid = keys_for(&section);
                    let (span, src) = locate(sources, &section, field);
                    ConfigError::UnknownKey {
                        suggestion: suggest_key(field, &valid),
                        valid_keys: valid.join(", "),
                        section,
                        key: field.clone(),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (span, src) = match path.as_slice() {
                        [section, field] => locate(sources, section, field),
                        _ => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Point validation errors at the line that set the offending value.
///
/// Values that came from defaults or the environment keep no span.
pub fn attach_sources(errors: Vec<ConfigError>, sources: &[TomlSource]) -> Vec<ConfigError> {
    errors
        .into_iter()
        .map(|error| match error {
            ConfigError::Validation {
                key,
                message,
                span: None,
                src: None,
            } => {
                let (span, src) = match key.split_once('.') {
                    Some((section, field)) => locate(sources, section, field),
                    None => (None, None),
                };
                ConfigError::Validation {
                    key,
                    message,
                    span,
                    src,
                }
            }
            other => other,
        })
        .collect()
}

/// Find `key` in the first source that sets it. Sources are ordered from
/// highest precedence to lowest.
fn locate(
    sources: &[TomlSource],
    section: &str,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    for (name, content) in sources {
        if let Some(offset) = key_offset(content, section, key) {
            let span = SourceSpan::new(offset.into(), key.len());
            return (Some(span), Some(NamedSource::new(name, content.clone())));
        }
    }
    (None, None)
}

/// Byte offset of `key` inside `[section]` of a TOML document.
///
/// An empty `section` matches a top-level key or a `[key]` header. Only the
/// named section is searched; a key of the same name in another section is
/// never matched.
pub fn key_offset(content: &str, section: &str, key: &str) -> Option<usize> {
    let mut current = "";
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().unwrap_or_default().trim();
            if section.is_empty() && name == key {
                return Some(offset + indent + 1 + (header.len() - header.trim_start().len()));
            }
            current = name;
        } else if current == section {
            if let Some(rest) = trimmed.strip_prefix(key) {
                if rest.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }

        offset += line.len();
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
