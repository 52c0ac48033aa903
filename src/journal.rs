// src/journal.rs

//! Durable, reason-coded event log.
//!
//! One line per event:
//!
//! ```text
//! [2026-10-18T09:00:00.123Z] [DR_STARTED] Started for noteA
//! ```
//!
//! The file is appended to, and created on first use. Each entry is also
//! emitted as a `tracing` event so it shows up in the diagnostic stream.
//! A journal that cannot be written never fails the operation that logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use crate::fs::FileSystem;
use crate::types::ReasonCode;

#[derive(Debug, Clone)]
pub struct Journal {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

/// A parsed journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub reason: ReasonCode,
    pub message: String,
}

impl JournalEntry {
    pub fn format(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.reason,
            self.message
        )
    }

    /// Parse a line produced by [`JournalEntry::format`].
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (ts, rest) = rest.split_once("] [")?;
        let (code, message) = rest.split_once("] ")?;
        let timestamp = DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc);
        let reason = code.parse().ok()?;
        Some(Self {
            timestamp,
            reason,
            message: message.to_string(),
        })
    }
}

impl Journal {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry stamped with the current time.
    pub fn record(&self, reason: ReasonCode, message: &str) {
        info!(reason = %reason, "{message}");

        let entry = JournalEntry {
            timestamp: Utc::now(),
            reason,
            message: message.to_string(),
        };
        let mut line = entry.format();
        line.push('\n');

        if let Err(e) = self.fs.append(&self.path, line.as_bytes()) {
            warn!(path = %self.path.display(), error = %e, "failed to write journal entry");
        }
    }

    /// The last `n` well-formed entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<JournalEntry> {
        let Ok(contents) = self.fs.read_to_string(&self.path) else {
            return Vec::new();
        };
        let entries: Vec<JournalEntry> = contents.lines().filter_map(JournalEntry::parse).collect();
        let skip = entries.len().saturating_sub(n);
        entries.into_iter().skip(skip).collect()
    }

    /// Every entry carrying `reason`, oldest first.
    pub fn entries_with(&self, reason: ReasonCode) -> Vec<JournalEntry> {
        self.recent(usize::MAX)
            .into_iter()
            .filter(|e| e.reason == reason)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn lines_have_timestamp_code_and_message() {
        let fs = MockFileSystem::new();
        let journal = Journal::new(Arc::new(fs.clone()), "logs/dr.log");

        journal.record(ReasonCode::Started, "Started for noteA");

        let raw = fs.read_to_string(Path::new("logs/dr.log")).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("] [DR_STARTED] Started for noteA\n"));
    }

    #[test]
    fn appends_rather_than_replaces() {
        let fs = MockFileSystem::new();
        let journal = Journal::new(Arc::new(fs), "dr.log");

        journal.record(ReasonCode::Started, "one");
        journal.record(ReasonCode::CompletedOk, "two");

        let entries = journal.recent(10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].reason, ReasonCode::Started);
        assert_eq!(entries[1].message, "two");
        assert_eq!(journal.recent(1)[0].message, "two");
    }

    #[test]
    fn unwritable_journal_is_swallowed() {
        let fs = MockFileSystem::new();
        fs.fail_writes_to("dr.log");
        let journal = Journal::new(Arc::new(fs), "dr.log");

        journal.record(ReasonCode::Abandoned, "ignored");
        assert!(journal.recent(5).is_empty());
    }

    #[test]
    fn message_may_contain_brackets() {
        let line = "[2026-10-18T09:00:00.000Z] [DR_REQUEST_FAILED] Run failed: [429] quota exceeded";
        let entry = JournalEntry::parse(line).unwrap();
        assert_eq!(entry.reason, ReasonCode::RequestFailed);
        assert_eq!(entry.message, "Run failed: [429] quota exceeded");
        assert_eq!(entry.format(), line);
    }
}
