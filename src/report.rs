// src/report.rs

//! Where finished reports go.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::vault::Vault;

/// Persists a completed report for a subject.
///
/// Implementations must be idempotent per subject name: a second write for
/// the same subject replaces the first.
pub trait ReportSink: Send + Sync {
    /// Write `report` for `subject_name` and return where it landed.
    fn write_report(&self, subject_name: &str, report: &str) -> Result<PathBuf>;
}

/// Writes `<vault>/<name>/<name>_deep_research.md`.
#[derive(Debug, Clone)]
pub struct VaultReportSink {
    vault: Vault,
}

impl VaultReportSink {
    pub fn new(vault: Vault) -> Self {
        Self { vault }
    }

    /// Vault-relative location of the report for `subject_name`.
    pub fn report_path(subject_name: &str) -> PathBuf {
        PathBuf::from(subject_name).join(format!("{subject_name}_deep_research.md"))
    }
}

/// Header placed above the provider's report text.
pub fn report_header(subject_name: &str, completed_at: DateTime<Utc>) -> String {
    format!(
        "# {subject_name} deep research report\n## {}\n\n",
        completed_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

impl ReportSink for VaultReportSink {
    fn write_report(&self, subject_name: &str, report: &str) -> Result<PathBuf> {
        let fs = self.vault.fs();
        let dir = self.vault.resolve(subject_name);
        if !fs.is_dir(&dir) {
            fs.create_dir_all(&dir)
                .with_context(|| format!("creating report folder {}", dir.display()))?;
        }

        let relative = Self::report_path(subject_name);
        let full = self.vault.resolve(&relative);
        let content = format!("{}{}", report_header(subject_name, Utc::now()), report);
        fs.write(&full, content.as_bytes())
            .with_context(|| format!("writing report {}", full.display()))?;

        debug!(subject = %subject_name, path = %full.display(), "report written");
        Ok(relative)
    }
}
