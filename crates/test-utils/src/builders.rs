#![allow(dead_code)]

use deep_research::config::{RawSettingsFile, ResearchSection, Settings};

pub const PROMPT_PATH: &str = "Templates/DeepResearchPrompt.md";
pub const ENV_FILE_PATH: &str = "/secrets/deep-research.env";

/// Builder for `Settings` to simplify test setup.
///
/// Starts from a configuration that can launch a run: enabled, with prompt
/// and credential paths set and the default intervals.
pub struct SettingsBuilder {
    raw: RawSettingsFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawSettingsFile {
                research: ResearchSection {
                    enabled: true,
                    prompt_path: PROMPT_PATH.to_string(),
                    env_file_path: ENV_FILE_PATH.to_string(),
                    ..ResearchSection::default()
                },
                current_run: None,
            },
        }
    }

    pub fn enabled(mut self, val: bool) -> Self {
        self.raw.research.enabled = val;
        self
    }

    pub fn prompt_path(mut self, path: &str) -> Self {
        self.raw.research.prompt_path = path.to_string();
        self
    }

    pub fn env_file_path(mut self, path: &str) -> Self {
        self.raw.research.env_file_path = path.to_string();
        self
    }

    pub fn check_interval_secs(mut self, secs: u64) -> Self {
        self.raw.research.check_interval_secs = secs;
        self
    }

    pub fn notice_interval_secs(mut self, secs: u64) -> Self {
        self.raw.research.notice_interval_secs = secs;
        self
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
