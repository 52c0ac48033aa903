// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::RunRecord;

/// Settings document as stored on disk.
///
/// ```toml
/// [research]
/// enabled = true
/// prompt_path = "Templates/DeepResearchPrompt.md"
/// env_file_path = "/home/me/.config/deep-research.env"
/// notice_interval_secs = 5
/// check_interval_secs = 60
///
/// [current_run]
/// interaction_id = "int_1"
/// subject_path = "Notes/noteA.md"
/// subject_name = "noteA"
/// start_time = "2026-10-18T09:00:00Z"
/// ```
///
/// `[current_run]` is owned by [`crate::store::FileRunStore`]; nothing else
/// writes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub research: ResearchSection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_run: Option<RunRecord>,
}

/// `[research]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSection {
    /// Master switch; starting a run is refused while `false`.
    #[serde(default)]
    pub enabled: bool,

    /// Vault-relative path of the prompt file. Empty means "not configured".
    #[serde(default)]
    pub prompt_path: String,

    /// Path of the credential (`.env`) file, usually outside the vault.
    /// Empty means "not configured".
    #[serde(default)]
    pub env_file_path: String,

    /// How often the "still running" notice is shown.
    #[serde(default = "default_notice_interval_secs")]
    pub notice_interval_secs: u64,

    /// How often the provider is asked for the run status.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Root of the note vault, relative to the settings file's directory.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,

    /// Journal file, relative to the vault root.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

fn default_notice_interval_secs() -> u64 {
    5
}

fn default_check_interval_secs() -> u64 {
    60
}

fn default_vault_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_path() -> PathBuf {
    PathBuf::from(".deep-research/deep-research.log")
}

impl Default for ResearchSection {
    fn default() -> Self {
        Self {
            enabled: false,
            prompt_path: String::new(),
            env_file_path: String::new(),
            notice_interval_secs: default_notice_interval_secs(),
            check_interval_secs: default_check_interval_secs(),
            vault_dir: default_vault_dir(),
            log_path: default_log_path(),
        }
    }
}

/// Validated, read-only settings handed to the run controller.
///
/// Constructed through `Settings::try_from(RawSettingsFile)`.
#[derive(Debug, Clone)]
pub struct Settings {
    research: ResearchSection,
}

impl Settings {
    /// Build without validation. Only `validate.rs` should call this.
    pub(crate) fn new_unchecked(research: ResearchSection) -> Self {
        Self { research }
    }

    pub fn section(&self) -> &ResearchSection {
        &self.research
    }

    pub fn enabled(&self) -> bool {
        self.research.enabled
    }

    /// Prompt path, or `None` when blank.
    pub fn prompt_path(&self) -> Option<&str> {
        non_blank(&self.research.prompt_path)
    }

    /// Credential file path, or `None` when blank.
    pub fn env_file_path(&self) -> Option<&Path> {
        non_blank(&self.research.env_file_path).map(Path::new)
    }

    pub fn vault_dir(&self) -> &Path {
        &self.research.vault_dir
    }

    pub fn log_path(&self) -> &Path {
        &self.research.log_path
    }

    pub fn intervals(&self) -> PollIntervals {
        PollIntervals {
            check: Duration::from_secs(self.research.check_interval_secs),
            notice: Duration::from_secs(self.research.notice_interval_secs),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Periods of the two polling timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub check: Duration,
    pub notice: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            check: Duration::from_secs(default_check_interval_secs()),
            notice: Duration::from_secs(default_notice_interval_secs()),
        }
    }
}
