#![allow(dead_code)]

pub use deep_research_test_utils::builders::{self, ENV_FILE_PATH, PROMPT_PATH, SettingsBuilder};
pub use deep_research_test_utils::fake_provider::{FakeProvider, ProviderCall};
pub use deep_research_test_utils::harness::{Harness, PROMPT_TEXT, RecordingNotifier};
pub use deep_research_test_utils::{init_tracing, with_timeout};

use chrono::{TimeZone, Utc};
use deep_research::store::RunRecord;
use deep_research::vault::Subject;

/// A record as it would have been persisted by an earlier successful start.
pub fn persisted_run(interaction_id: &str, note_path: &str) -> RunRecord {
    let started = Utc
        .with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
        .single()
        .unwrap();
    RunRecord::started_at(interaction_id, &Subject::from_path(note_path), started)
}

pub fn note_a() -> Subject {
    Subject::from_path("Notes/noteA.md")
}

pub fn note_b() -> Subject {
    Subject::from_path("Notes/noteB.md")
}
