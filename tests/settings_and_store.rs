// tests/settings_and_store.rs

mod common;
use crate::common::{persisted_run, with_timeout};

use std::io::Write;
use tempfile::NamedTempFile;

use deep_research::config::{load_and_validate, load_from_path};
use deep_research::errors::ResearchError;
use deep_research::store::{FileRunStore, RunStore};

#[test]
fn zero_notice_interval_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[research]
enabled = true
notice_interval_secs = 0
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(ResearchError::ConfigError(msg)) => assert!(msg.contains("notice_interval_secs")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn huge_check_interval_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[research]
enabled = true
check_interval_secs = 9223372036854775807
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(ResearchError::ConfigError(msg)) => assert!(msg.contains("check_interval_secs")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[research\nenabled = yes").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ResearchError::TomlError(_))
    ));
}

#[test]
fn missing_settings_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("DeepResearch.toml")),
        Err(ResearchError::IoError(_))
    ));
}

#[test]
fn omitted_fields_take_documented_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[research]
enabled = true
prompt_path = "Templates/prompt.md"
env_file_path = "/home/me/.config/dr.env"
"#
    )
    .unwrap();

    let settings = load_and_validate(file.path()).unwrap();
    assert!(settings.enabled());
    assert_eq!(settings.prompt_path(), Some("Templates/prompt.md"));
    assert_eq!(settings.intervals().check.as_secs(), 60);
    assert_eq!(settings.intervals().notice.as_secs(), 5);
    assert_eq!(
        settings.log_path(),
        std::path::Path::new(".deep-research/deep-research.log")
    );
}

#[tokio::test]
async fn run_record_lives_next_to_the_settings_it_belongs_to() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DeepResearch.toml");
    std::fs::write(
        &path,
        "[research]\nenabled = true\nprompt_path = \"p.md\"\ncheck_interval_secs = 30\n",
    )
    .unwrap();

    let store = FileRunStore::new(&path);
    let record = persisted_run("int_1", "Notes/noteA.md");
    with_timeout(store.set(Some(record.clone()))).await.unwrap();

    // A fresh store (e.g. after a restart) sees the same record.
    let reopened = FileRunStore::new(&path);
    assert_eq!(reopened.get().await.unwrap(), Some(record));

    // The `[research]` table survived the rewrite.
    let settings = load_and_validate(&path).unwrap();
    assert_eq!(settings.prompt_path(), Some("p.md"));
    assert_eq!(settings.intervals().check.as_secs(), 30);

    reopened.set(None).await.unwrap();
    assert!(load_from_path(&path).unwrap().current_run.is_none());
    assert!(!dir.path().join("DeepResearch.toml.tmp").exists());
}
