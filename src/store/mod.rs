// src/store/mod.rs

//! Persistence of the single in-flight run.
//!
//! There is at most one [`RunRecord`] at any time. It is replaced as a whole
//! value (`set(Some(..))`) and destroyed by `set(None)`; it is never edited in
//! place. `set` only returns once the new value is durable, which is the
//! boundary the controller relies on before arming timers or reporting an
//! abandonment.
//!
//! - [`file`] stores the record in the `[current_run]` table of the settings
//!   file (production).
//! - [`memory`] keeps it in memory (tests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::BoxFuture;
use crate::vault::Subject;

pub mod file;
pub mod memory;

pub use file::FileRunStore;
pub use memory::MemoryRunStore;

/// The persisted unit of in-flight work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    interaction_id: String,
    subject_path: String,
    subject_name: String,
    start_time: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(interaction_id: impl Into<String>, subject: &Subject) -> Self {
        Self::started_at(interaction_id, subject, Utc::now())
    }

    pub fn started_at(
        interaction_id: impl Into<String>,
        subject: &Subject,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            subject_path: subject.path().to_string(),
            subject_name: subject.name().to_string(),
            start_time,
        }
    }

    /// Opaque provider handle.
    pub fn interaction_id(&self) -> &str {
        &self.interaction_id
    }

    pub fn subject_path(&self) -> &str {
        &self.subject_path
    }

    /// Display name of the subject; also names the report.
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

/// Holder of the single persisted run record.
pub trait RunStore: Send + Sync {
    /// Current record, if any.
    fn get(&self) -> BoxFuture<'_, Result<Option<RunRecord>>>;

    /// Replace the record (`None` clears it). Resolves once persisted.
    fn set(&self, record: Option<RunRecord>) -> BoxFuture<'_, Result<()>>;
}
