// src/engine/controller.rs

//! The single-run state machine.
//!
//! States are derived from the run store: `Idle` when it holds no record,
//! `Running` when it holds one. The only transitions are
//! `Idle -> Running` (successful start) and `Running -> Idle` (completion,
//! failure or abandonment).
//!
//! Every fallible step yields a [`RunError`]; [`RunController::surface`] is
//! the one place that decides, from the error itself, whether the user sees
//! it. All failures are journaled.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::errors::RunError;
use crate::journal::Journal;
use crate::notify::Notifier;
use crate::provider::{ProviderFactory, ResearchProvider, ResearchStatus};
use crate::report::ReportSink;
use crate::store::{RunRecord, RunStore};
use crate::types::{ReasonCode, Visibility};
use crate::vault::{Subject, Vault};

use super::RunEvent;
use super::scheduler::PollingScheduler;

/// External collaborators the controller is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn RunStore>,
    pub providers: Arc<dyn ProviderFactory>,
    pub vault: Vault,
    pub reports: Arc<dyn ReportSink>,
    pub notifier: Arc<dyn Notifier>,
    pub journal: Journal,
}

/// What a single status check led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing to poll (no record or no provider); timers were stopped.
    Stopped,
    /// The job is still running; nothing changed.
    Running,
    /// The status could not be observed this tick; polling continues.
    Unobserved,
    /// The record changed while the call was in flight; result discarded.
    Stale,
    /// The job completed; `saved_to` is the vault-relative report path when
    /// the report could be written.
    Completed { saved_to: Option<PathBuf> },
    /// The job failed with the provider's error text.
    Failed { error: String },
}

/// Emits the "in progress" reminder for the persisted run.
///
/// Silent once the timers are stopped, even if the record is still there.
#[derive(Clone)]
pub struct ProgressNotice {
    store: Arc<dyn RunStore>,
    notifier: Arc<dyn Notifier>,
    armed: Arc<AtomicBool>,
}

impl ProgressNotice {
    pub async fn emit(&self) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        if let Ok(Some(record)) = self.store.get().await {
            self.notifier.notify(&format!(
                "Deep Research in progress for {}...",
                record.subject_name()
            ));
        }
    }
}

pub struct RunController {
    settings: Settings,
    deps: Collaborators,
    provider: Option<Arc<dyn ResearchProvider>>,
    scheduler: PollingScheduler,
}

impl RunController {
    pub fn new(settings: Settings, deps: Collaborators, event_tx: mpsc::Sender<RunEvent>) -> Self {
        Self {
            settings,
            deps,
            provider: None,
            scheduler: PollingScheduler::new(event_tx),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether the polling timers are armed.
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// The persisted record, if any.
    pub async fn current_run(&self) -> Result<Option<RunRecord>, RunError> {
        self.deps
            .store
            .get()
            .await
            .map_err(|e| RunError::Persist(e.to_string()))
    }

    /// Start a research run for `subject`.
    ///
    /// Nothing is persisted and no timer is armed unless the provider
    /// accepted the job.
    pub async fn start_research(&mut self, subject: &Subject) -> Result<RunRecord, RunError> {
        match self.try_start(subject).await {
            Ok(record) => Ok(record),
            Err(e) => {
                self.surface(&e);
                Err(e)
            }
        }
    }

    async fn try_start(&mut self, subject: &Subject) -> Result<RunRecord, RunError> {
        if !self.settings.enabled() {
            return Err(RunError::Disabled);
        }
        let prompt_path = self
            .settings
            .prompt_path()
            .ok_or(RunError::PromptPathMissing)?
            .to_string();
        let env_file = self
            .deps
            .vault
            .resolve(self.settings.env_file_path().ok_or(RunError::EnvPathMissing)?);

        if let Some(current) = self.current_run().await? {
            return Err(RunError::Busy {
                subject: current.subject_name().to_string(),
            });
        }

        let provider = self
            .deps
            .providers
            .create(&env_file)
            .map_err(|e| RunError::ProviderInit(e.to_string()))?;
        self.provider = Some(Arc::clone(&provider));

        let prompt = self
            .deps
            .vault
            .read_note(&prompt_path)
            .map_err(|e| RunError::PromptRead(format!("{e:#}")))?;
        let context = self
            .deps
            .vault
            .read_note(subject.path())
            .map_err(|e| RunError::NoteRead(format!("{e:#}")))?;

        let interaction_id = provider
            .start(&context, &prompt)
            .await
            .map_err(|e| RunError::StartRequest(e.to_string()))?;

        let record = RunRecord::new(interaction_id, subject);
        self.deps
            .store
            .set(Some(record.clone()))
            .await
            .map_err(|e| {
                RunError::Persist(format!(
                    "{e} (remote interaction {} has no local record)",
                    record.interaction_id()
                ))
            })?;

        self.deps
            .notifier
            .notify("Deep research started. Running in background...");
        self.deps
            .journal
            .record(ReasonCode::Started, &format!("Started for {}", subject.name()));
        info!(
            subject = %subject.name(),
            interaction_id = %record.interaction_id(),
            "research run started"
        );

        self.scheduler.start(self.settings.intervals());
        Ok(record)
    }

    /// Resume polling a persisted run (e.g. after a restart).
    ///
    /// Idempotent: returns `Ok(true)` straight away when already polling.
    /// Returns `Ok(false)` when there is nothing to poll. A provider is built
    /// from the credential file when none is held yet.
    pub async fn start_polling(&mut self) -> Result<bool, RunError> {
        if self.scheduler.is_armed() {
            return Ok(true);
        }
        let result = self.try_start_polling().await;
        if let Err(e) = &result {
            self.surface(e);
        }
        result
    }

    async fn try_start_polling(&mut self) -> Result<bool, RunError> {
        let Some(record) = self.current_run().await? else {
            debug!("no persisted run; nothing to poll");
            return Ok(false);
        };

        if self.provider.is_none() {
            let env_file = self
                .deps
                .vault
                .resolve(self.settings.env_file_path().ok_or(RunError::EnvPathMissing)?);
            let provider = self
                .deps
                .providers
                .create(&env_file)
                .map_err(|e| RunError::ProviderInit(e.to_string()))?;
            self.provider = Some(provider);
        }

        self.scheduler.start(self.settings.intervals());
        info!(
            subject = %record.subject_name(),
            interaction_id = %record.interaction_id(),
            "polling resumed"
        );
        Ok(true)
    }

    /// Clear the current run without contacting the provider.
    ///
    /// Returns the abandoned record, or `None` when there was nothing to
    /// abandon (which is not an error).
    pub async fn reset_abandon_run(&mut self) -> Result<Option<RunRecord>, RunError> {
        let current = match self.current_run().await {
            Ok(current) => current,
            Err(e) => {
                self.surface(&e);
                return Err(e);
            }
        };

        let Some(record) = current else {
            self.deps.notifier.notify("No active run to abandon.");
            return Ok(None);
        };

        if let Err(e) = self.deps.store.set(None).await {
            let err = RunError::Persist(e.to_string());
            self.surface(&err);
            return Err(err);
        }
        self.scheduler.stop();

        let name = record.subject_name();
        self.deps
            .notifier
            .notify(&format!("Deep Research run for {name} abandoned."));
        self.deps
            .journal
            .record(ReasonCode::Abandoned, &format!("Run for {name} abandoned"));
        Ok(Some(record))
    }

    /// Handle a `StatusTick` from the runtime.
    ///
    /// Ticks that were already queued when the timers were stopped are
    /// ignored and yield `None`.
    pub async fn on_status_tick(&mut self) -> Option<CheckOutcome> {
        if !self.scheduler.is_armed() {
            debug!("status tick after stop; ignoring");
            return None;
        }
        self.scheduler.acknowledge_status_tick();
        Some(self.check_run_status().await)
    }

    /// Handle a `NoticeTick`: remind the user while a run exists.
    pub async fn on_notice_tick(&self) {
        self.progress_notice().emit().await;
    }

    /// A detached handle for progress notices, usable while a status check
    /// holds the controller.
    pub fn progress_notice(&self) -> ProgressNotice {
        ProgressNotice {
            store: Arc::clone(&self.deps.store),
            notifier: Arc::clone(&self.deps.notifier),
            armed: self.scheduler.armed_flag(),
        }
    }

    /// Stop polling but keep the persisted run.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        info!("polling stopped; persisted run (if any) kept for resume");
    }

    /// Ask the provider about the current run and act on a terminal outcome.
    pub async fn check_run_status(&mut self) -> CheckOutcome {
        let record = match self.deps.store.get().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("status check with no persisted run; stopping polling");
                self.scheduler.stop();
                return CheckOutcome::Stopped;
            }
            Err(e) => {
                self.surface(&RunError::StatusCheck(e.to_string()));
                return CheckOutcome::Unobserved;
            }
        };
        let Some(provider) = self.provider.clone() else {
            warn!("status check without a provider; stopping polling");
            self.scheduler.stop();
            return CheckOutcome::Stopped;
        };

        let status = match provider.check_status(record.interaction_id()).await {
            Ok(status) => status,
            Err(e) => {
                self.surface(&RunError::StatusCheck(e.to_string()));
                return CheckOutcome::Unobserved;
            }
        };

        // The record may have been cleared or replaced while we waited.
        match self.deps.store.get().await {
            Ok(Some(now)) if now.interaction_id() == record.interaction_id() => {}
            Ok(Some(_)) => {
                debug!(
                    interaction_id = %record.interaction_id(),
                    "run replaced during status check; discarding result"
                );
                self.scheduler.stop();
                return CheckOutcome::Stale;
            }
            Ok(None) => {
                debug!(
                    interaction_id = %record.interaction_id(),
                    "run cleared during status check; discarding result"
                );
                self.scheduler.stop();
                return CheckOutcome::Stale;
            }
            Err(e) => {
                self.surface(&RunError::StatusCheck(e.to_string()));
                return CheckOutcome::Unobserved;
            }
        }

        match status {
            ResearchStatus::Running => {
                debug!(interaction_id = %record.interaction_id(), "still running");
                CheckOutcome::Running
            }
            ResearchStatus::Completed { report } => {
                self.handle_completion(provider.as_ref(), &record, report)
                    .await
            }
            ResearchStatus::Failed { error } => self.handle_failure(&record, error).await,
        }
    }

    async fn handle_completion(
        &mut self,
        provider: &dyn ResearchProvider,
        record: &RunRecord,
        inline_report: Option<String>,
    ) -> CheckOutcome {
        // Stop first so no later tick can complete this run a second time.
        self.scheduler.stop();

        let saved_to = match self.save_report(provider, record, inline_report).await {
            Ok(path) => {
                let name = record.subject_name();
                self.deps.notifier.notify(&format!(
                    "Deep Research completed for {name}. Saved to {}",
                    path.display()
                ));
                self.deps
                    .journal
                    .record(ReasonCode::CompletedOk, &format!("Completed for {name}"));
                Some(path)
            }
            Err(e) => {
                self.surface(&e);
                None
            }
        };

        self.clear_record(record).await;
        CheckOutcome::Completed { saved_to }
    }

    async fn save_report(
        &self,
        provider: &dyn ResearchProvider,
        record: &RunRecord,
        inline_report: Option<String>,
    ) -> Result<PathBuf, RunError> {
        let report = match inline_report.filter(|r| !r.trim().is_empty()) {
            Some(report) => report,
            None => provider
                .get_report(record.interaction_id())
                .await
                .map_err(|e| RunError::ReportNotSaved(e.to_string()))?,
        };
        if report.trim().is_empty() {
            return Err(RunError::ReportNotSaved(
                "No report content available".to_string(),
            ));
        }

        self.deps
            .reports
            .write_report(record.subject_name(), &report)
            .map_err(|e| RunError::ReportNotSaved(format!("{e:#}")))
    }

    async fn handle_failure(&mut self, record: &RunRecord, error: String) -> CheckOutcome {
        self.scheduler.stop();

        let name = record.subject_name();
        self.deps
            .notifier
            .notify(&format!("Deep Research failed for {name}: {error}"));
        self.deps
            .journal
            .record(ReasonCode::RequestFailed, &format!("Run failed: {error}"));

        self.clear_record(record).await;
        CheckOutcome::Failed { error }
    }

    /// Clear the persisted run, but only if it is still `record`.
    async fn clear_record(&self, record: &RunRecord) {
        match self.deps.store.get().await {
            Ok(Some(now)) if now.interaction_id() == record.interaction_id() => {}
            Ok(_) => {
                debug!(
                    interaction_id = %record.interaction_id(),
                    "run changed while finishing; leaving the store alone"
                );
                return;
            }
            Err(e) => {
                self.surface(&RunError::Persist(e.to_string()));
                return;
            }
        }
        if let Err(e) = self.deps.store.set(None).await {
            self.surface(&RunError::Persist(e.to_string()));
        }
    }

    /// Route a failure to the notifier (when user-facing) and the journal.
    fn surface(&self, err: &RunError) {
        match err.visibility() {
            Visibility::UserFacing => {
                warn!(reason = %err.reason(), "{err}");
                self.deps.notifier.notify(&err.to_string());
            }
            Visibility::Silent => {
                debug!(reason = %err.reason(), "{err}");
            }
        }
        self.deps.journal.record(err.reason(), &err.journal_message());
    }
}
