// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::{ResearchError, Result};

/// Load a settings file from a given path and return the raw document.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettingsFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawSettingsFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a settings file from path and validate it.
///
/// The persisted `[current_run]` table is ignored here; the run store reads
/// it on demand so the controller never works from a stale copy.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(&path)?;
    let settings = Settings::try_from(raw)?;
    Ok(settings)
}

/// Write a default settings file, refusing to clobber an existing one.
pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(ResearchError::ConfigError(format!(
            "settings file {} already exists",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(&RawSettingsFile::default())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;

    info!(path = %path.display(), "wrote default settings");
    Ok(())
}

/// Default settings path: `DeepResearch.toml` in the current directory,
/// unless `DEEP_RESEARCH_CONFIG` points elsewhere.
pub fn default_settings_path() -> PathBuf {
    std::env::var_os("DEEP_RESEARCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("DeepResearch.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_default_then_load_gives_documented_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DeepResearch.toml");

        write_default(&path).unwrap();
        let settings = load_and_validate(&path).unwrap();

        assert!(!settings.enabled());
        assert_eq!(settings.prompt_path(), None);
        assert_eq!(settings.intervals().check.as_secs(), 60);
        assert_eq!(settings.intervals().notice.as_secs(), 5);
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DeepResearch.toml");
        fs::write(&path, "[research]\nenabled = true\n").unwrap();

        assert!(matches!(
            write_default(&path),
            Err(ResearchError::ConfigError(_))
        ));
        assert!(load_and_validate(&path).unwrap().enabled());
    }
}
