//! Controller wired to in-memory collaborators.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use deep_research::config::Settings;
use deep_research::engine::{Collaborators, RunController, RunEvent};
use deep_research::fs::FileSystem;
use deep_research::fs::mock::MockFileSystem;
use deep_research::journal::{Journal, JournalEntry};
use deep_research::notify::Notifier;
use deep_research::report::VaultReportSink;
use deep_research::store::MemoryRunStore;
use deep_research::types::ReasonCode;
use deep_research::vault::Vault;

use crate::builders::PROMPT_PATH;
use crate::fake_provider::{FakeProvider, FakeProviderFactory};

pub const VAULT_ROOT: &str = "vault";
pub const LOG_PATH: &str = ".deep-research/deep-research.log";
pub const PROMPT_TEXT: &str = "Research the topic below in depth.";

/// Notifier that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.contains(needle))
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// All test doubles in one place. Every handle shares state with what the
/// controller sees, so tests can script and inspect from outside.
pub struct Harness {
    pub fs: MockFileSystem,
    pub store: MemoryRunStore,
    pub provider: Arc<FakeProvider>,
    pub factory: Arc<FakeProviderFactory>,
    pub notifier: Arc<RecordingNotifier>,
    pub vault: Vault,
    pub journal: Journal,
}

impl Harness {
    /// A vault holding the prompt file plus `Notes/noteA.md` and
    /// `Notes/noteB.md`.
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        let vault = Vault::new(Arc::new(fs.clone()), VAULT_ROOT);
        let journal = Journal::new(Arc::new(fs.clone()), vault.resolve(LOG_PATH));
        let provider = Arc::new(FakeProvider::new());

        let harness = Self {
            fs,
            store: MemoryRunStore::new(),
            factory: Arc::new(FakeProviderFactory::new(provider.clone())),
            provider,
            notifier: Arc::new(RecordingNotifier::default()),
            vault,
            journal,
        };
        harness.add_note(PROMPT_PATH, PROMPT_TEXT);
        harness.add_note("Notes/noteA.md", "Alpha note body");
        harness.add_note("Notes/noteB.md", "Beta note body");
        harness
    }

    pub fn add_note(&self, path: &str, content: &str) {
        self.fs.add_file(self.vault.resolve(path), content);
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: Arc::new(self.store.clone()),
            providers: self.factory.clone(),
            vault: self.vault.clone(),
            reports: Arc::new(VaultReportSink::new(self.vault.clone())),
            notifier: self.notifier.clone(),
            journal: self.journal.clone(),
        }
    }

    /// A controller and the receiving end of its event channel.
    pub fn controller(&self, settings: Settings) -> (RunController, mpsc::Receiver<RunEvent>) {
        let (tx, rx) = mpsc::channel(64);
        (RunController::new(settings, self.collaborators(), tx), rx)
    }

    pub fn journal_entries(&self) -> Vec<JournalEntry> {
        self.journal.recent(usize::MAX)
    }

    pub fn reason_codes(&self) -> Vec<ReasonCode> {
        self.journal_entries().into_iter().map(|e| e.reason).collect()
    }

    /// Contents of the saved report for `subject_name`, if any.
    pub fn report(&self, subject_name: &str) -> Option<String> {
        let path: PathBuf = self
            .vault
            .resolve(VaultReportSink::report_path(subject_name));
        self.fs.read_to_string(&path).ok()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
