// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Archivist configuration system.

use archivist_config::diagnostic::{keys_for, suggest_key, ConfigError, SECTION_KEYS};
use archivist_config::model::{ArchivistConfig, SearchMode};
use archivist_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_archivist_config() {
    let toml = r#"
[agent]
name = "archive-bot"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
welcome_text = "hi"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[ingest]
max_file_size = 1000
event_timeout_secs = 60

[describe]
api_key = "mistral-key"
base_url = "http://127.0.0.1:9000"
model = "pixtral-large"
language = "English"
retry_backoff_secs = 1
max_retries = 2
retry_throttled_forever = false
video_frames = 4

[embedding]
host = "http://ollama:11434"
model = "nomic-embed-text"
dimensions = 768

[search]
mode = "most_similar"
k = 5
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "archive-bot");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.welcome_text, "hi");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.ingest.max_file_size, 1000);
    assert_eq!(config.ingest.event_timeout_secs, 60);
    assert_eq!(config.describe.api_key.as_deref(), Some("mistral-key"));
    assert_eq!(config.describe.base_url, "http://127.0.0.1:9000");
    assert_eq!(config.describe.model, "pixtral-large");
    assert_eq!(config.describe.language, "English");
    assert_eq!(config.describe.retry_backoff_secs, 1);
    assert_eq!(config.describe.max_retries, 2);
    assert!(!config.describe.retry_throttled_forever);
    assert_eq!(config.describe.video_frames, 4);
    assert_eq!(config.embedding.host, "http://ollama:11434");
    assert_eq!(config.embedding.model, "nomic-embed-text");
    assert_eq!(config.embedding.dimensions, 768);
    assert_eq!(config.search.mode, SearchMode::MostSimilar);
    assert_eq!(config.search.k, 5);
}

/// Unknown field in [agent] section produces an UnknownField error.
#[test]
fn unknown_field_in_agent_produces_error() {
    let toml = r#"
[agent]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown field in [embedding] section produces an UnknownField error.
#[test]
fn unknown_field_in_embedding_produces_error() {
    let toml = r#"
[embedding]
dimensoins = 1024
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("dimensoins"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "archivist");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.describe.api_key.is_none());
    assert_eq!(config.describe.base_url, "https://api.mistral.ai");
    assert_eq!(config.describe.model, "pixtral-12b-2409");
    assert_eq!(config.describe.language, "Russian");
    assert_eq!(config.embedding.host, "http://localhost:11434");
    assert_eq!(config.embedding.model, "snowflake-arctic-embed2");
    assert_eq!(config.embedding.dimensions, 1024);
    assert_eq!(config.ingest.max_file_size, 20_000_000);
    assert_eq!(config.ingest.event_timeout_secs, 900);
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("archivist.db"));
    assert_eq!(config.search.mode, SearchMode::Multi);
    assert_eq!(config.search.k, 3);
}

/// A dotted override (as produced by the env provider) beats TOML values.
#[test]
fn override_beats_toml_value() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[describe]
max_retries = 3
"#;

    let config: ArchivistConfig = Figment::new()
        .merge(Serialized::defaults(ArchivistConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("describe.max_retries", 9))
        .extract()
        .expect("should merge override");

    assert_eq!(config.describe.max_retries, 9);
}

/// `telegram.bot_token` is set through dot notation, not `telegram.bot.token`.
#[test]
fn override_sets_telegram_bot_token() {
    use figment::{providers::Serialized, Figment};

    let config: ArchivistConfig = Figment::new()
        .merge(Serialized::defaults(ArchivistConfig::default()))
        .merge(("telegram.bot_token", "xyz-from-env"))
        .extract()
        .expect("should set bot_token via dot notation");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: ArchivistConfig = Figment::new()
        .merge(Serialized::defaults(ArchivistConfig::default()))
        .merge(Toml::file("/nonexistent/path/archivist.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "archivist");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// An unknown search mode is rejected at deserialization time.
#[test]
fn unknown_search_mode_is_rejected() {
    let toml = r#"
[search]
mode = "fuzzy"
"#;

    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn diagnostic_naem_suggests_name() {
    let valid_keys = &["name", "log_level"];
    assert_eq!(suggest_key("naem", valid_keys), Some("name".to_string()));
}

#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["name", "log_level"];
    assert!(suggest_key("zzzzzz", valid_keys).is_none());
}

/// Error output from load_and_validate_str includes the unknown key name.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[embedding]
dimensoins = 1024
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "dimensoins"
                && suggestion.as_deref() == Some("dimensions")
                && valid_keys.contains("host")
                && valid_keys.contains("model")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'dimensoins' with suggestion, got: {errors:?}"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[search]
k = "three"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("k"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        section: "agent".to_string(),
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some(), "should have diagnostic code");
    let help = error.help().expect("should have help text").to_string();
    assert!(help.contains("did you mean `name`"), "got: {help}");

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("naem"));
}

/// load_and_validate_str collects every validation failure at once.
#[test]
fn validation_reports_all_failures() {
    let toml = r#"
[ingest]
max_file_size = 0

[search]
k = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero limits should fail");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("max_file_size")));
    assert!(messages.iter().any(|m| m.contains("search.k")));
}

#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[agent]
name = "test"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.agent.name, "test");
}

/// An explicit config path is honoured and validated.
#[test]
fn load_and_validate_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archivist.toml");
    std::fs::write(&path, "[search]\nk = 7\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should validate");
    assert_eq!(config.search.k, 7);
}

/// Validation failures in an explicit file surface as diagnostics.
#[test]
fn load_and_validate_from_explicit_path_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archivist.toml");
    std::fs::write(&path, "[embedding]\ndimensions = 0\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("zero dimensions should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message, .. } if message.contains("dimensions"))
    ));
}

/// Validation failures point at the line that set the bad value.
#[test]
fn validation_errors_carry_spans() {
    let toml = "[ingest]\nmax_file_size = 0\n\n[search]\nmode = \"multi\"\nk = 0\n";

    let errors = load_and_validate_str(toml).expect_err("zero limits should fail");
    let located: Vec<(String, usize)> = errors
        .iter()
        .filter_map(|e| match e {
            ConfigError::Validation {
                key,
                span: Some(span),
                src: Some(_),
                ..
            } => Some((key.clone(), span.offset())),
            _ => None,
        })
        .collect();

    assert_eq!(
        located,
        vec![
            ("ingest.max_file_size".to_string(), toml.find("max_file_size").unwrap()),
            ("search.k".to_string(), toml.find("k = 0").unwrap()),
        ]
    );
}

/// A rendered validation error shows the offending line.
#[test]
fn validation_error_renders_source_line() {
    use miette::GraphicalReportHandler;

    let path_dir = tempfile::tempdir().unwrap();
    let path = path_dir.path().join("archivist.toml");
    std::fs::write(&path, "[search]\nk = 0\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("k = 0 should fail");
    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &errors[0])
        .expect("should render without error");
    assert!(buf.contains("k = 0"), "got: {buf}");
    assert!(buf.contains("archivist.toml"), "got: {buf}");
}

/// A key placed in the wrong section is pointed at its real section.
#[test]
fn misplaced_key_suggests_its_section() {
    use miette::Diagnostic;

    let toml = "[ingest]\nk = 3\n";

    let errors = load_and_validate_str(toml).expect_err("k is not an ingest key");
    let error = errors
        .iter()
        .find(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "k"))
        .expect("should report the unknown key");
    let help = error.help().expect("should have help text").to_string();
    assert_eq!(help, "`k` belongs in the [search] section");
    match error {
        ConfigError::UnknownKey { section, span, .. } => {
            assert_eq!(section, "ingest");
            assert_eq!(span.map(|s| s.offset()), toml.find("k = 3"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

/// Typos in describe and search keys get suggestions from their own section.
#[test]
fn typos_suggest_keys_from_their_section() {
    let toml = r#"
[describe]
vidoe_frames = 2

[search]
mdoe = "multi"
"#;

    let errors = load_and_validate_str(toml).expect_err("typos should fail");
    let suggestions: Vec<(String, Option<String>)> = errors
        .iter()
        .filter_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .collect();
    assert!(suggestions.contains(&("vidoe_frames".into(), Some("video_frames".into()))));
    assert!(suggestions.contains(&("mdoe".into(), Some("mode".into()))));
}

/// The suggestion tables list exactly the fields the deserializer accepts.
#[test]
fn section_tables_match_config_fields() {
    use figment::error::Kind;

    let mut sections: Vec<&str> = SECTION_KEYS.iter().map(|(name, _)| *name).collect();
    sections.push("");

    for section in sections {
        let toml = if section.is_empty() {
            "not_a_key = 1\n".to_string()
        } else {
            format!("[{section}]\nnot_a_key = 1\n")
        };
        let err = load_config_from_str(&toml).expect_err("unknown key should be rejected");
        let expected: Vec<&str> = err
            .into_iter()
            .find_map(|e| match e.kind {
                Kind::UnknownField(_, expected) => Some(expected.to_vec()),
                _ => None,
            })
            .expect("should report an unknown field");

        let mut expected = expected;
        let mut ours = keys_for(section);
        expected.sort_unstable();
        ours.sort_unstable();
        assert_eq!(ours, expected, "section [{section}]");
    }
}
