// src/config/validate.rs

use crate::config::model::{RawSettingsFile, ResearchSection, Settings};
use crate::errors::{ResearchError, Result};

impl TryFrom<RawSettingsFile> for Settings {
    type Error = crate::errors::ResearchError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_research_section(&raw.research)?;
        Ok(Settings::new_unchecked(raw.research))
    }
}

fn validate_research_section(section: &ResearchSection) -> Result<()> {
    validate_intervals(section)?;
    validate_paths(section)?;
    Ok(())
}

/// One week. Ticker deadlines overflow near `u64::MAX`.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

fn validate_intervals(section: &ResearchSection) -> Result<()> {
    check_interval_range("check_interval_secs", section.check_interval_secs)?;
    check_interval_range("notice_interval_secs", section.notice_interval_secs)?;
    Ok(())
}

fn check_interval_range(field: &str, secs: u64) -> Result<()> {
    if secs == 0 {
        return Err(ResearchError::ConfigError(format!(
            "[research].{field} must be >= 1 (got 0)"
        )));
    }
    if secs > MAX_INTERVAL_SECS {
        return Err(ResearchError::ConfigError(format!(
            "[research].{field} must be <= {MAX_INTERVAL_SECS} (got {secs})"
        )));
    }
    Ok(())
}

fn validate_paths(section: &ResearchSection) -> Result<()> {
    // prompt_path / env_file_path may be blank: that is reported when a run
    // is requested, not at load time.
    if section.log_path.as_os_str().is_empty() {
        return Err(ResearchError::ConfigError(
            "[research].log_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_check_interval_is_rejected() {
        let mut raw = RawSettingsFile::default();
        raw.research.check_interval_secs = 0;

        match Settings::try_from(raw) {
            Err(ResearchError::ConfigError(msg)) => assert!(msg.contains("check_interval_secs")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn oversized_intervals_are_rejected() {
        let mut raw = RawSettingsFile::default();
        raw.research.check_interval_secs = u64::MAX;
        match Settings::try_from(raw) {
            Err(ResearchError::ConfigError(msg)) => {
                assert!(msg.contains("check_interval_secs"), "{msg}")
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }

        let mut raw = RawSettingsFile::default();
        raw.research.notice_interval_secs = MAX_INTERVAL_SECS + 1;
        assert!(Settings::try_from(raw).is_err());

        let mut raw = RawSettingsFile::default();
        raw.research.notice_interval_secs = MAX_INTERVAL_SECS;
        assert!(Settings::try_from(raw).is_ok());
    }

    #[test]
    fn blank_paths_validate_but_read_as_unconfigured() {
        let mut raw = RawSettingsFile::default();
        raw.research.prompt_path = "   ".to_string();

        let settings = Settings::try_from(raw).unwrap();
        assert_eq!(settings.prompt_path(), None);
        assert_eq!(settings.env_file_path(), None);
    }
}
