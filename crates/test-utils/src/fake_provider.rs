use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use deep_research::provider::{ProviderError, ProviderFactory, ResearchProvider, ResearchStatus};
use deep_research::types::BoxFuture;

/// One call observed by [`FakeProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Start { context: String, prompt: String },
    CheckStatus(String),
    GetReport(String),
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// A scripted provider that:
/// - hands out `int_1`, `int_2`, ... from `start` (unless told to fail)
/// - answers `check_status` from a queue, then `Running` once it is empty
/// - answers `get_report` with a fixed result
/// - records every call.
pub struct FakeProvider {
    next_id: Mutex<u32>,
    start_error: Mutex<Option<String>>,
    statuses: Mutex<VecDeque<Result<ResearchStatus, String>>>,
    report: Mutex<Result<String, String>>,
    check_delay: Mutex<Option<Duration>>,
    on_check: Mutex<Option<Hook>>,
    on_report: Mutex<Option<Hook>>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            start_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            report: Mutex::new(Err("no report scripted".to_string())),
            check_delay: Mutex::new(None),
            on_check: Mutex::new(None),
            on_report: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_start(&self, message: &str) {
        *self.start_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn push_status(&self, status: ResearchStatus) {
        self.statuses.lock().unwrap().push_back(Ok(status));
    }

    pub fn push_status_error(&self, message: &str) {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn set_report(&self, report: Result<&str, &str>) {
        *self.report.lock().unwrap() = report.map(str::to_string).map_err(str::to_string);
    }

    /// Make every `check_status` take `delay` (tokio time).
    pub fn set_check_delay(&self, delay: Duration) {
        *self.check_delay.lock().unwrap() = Some(delay);
    }

    /// Run `hook` inside `check_status`, before it answers. Used to change
    /// the run store while a check is in flight.
    pub fn on_check(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_check.lock().unwrap() = Some(Box::new(hook));
    }

    /// Run `hook` inside `get_report`, before it answers.
    pub fn on_report(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_report.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn start_calls(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::Start { .. }))
    }

    pub fn check_calls(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::CheckStatus(_)))
    }

    pub fn report_calls(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::GetReport(_)))
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchProvider for FakeProvider {
    fn start<'a>(
        &'a self,
        context: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            self.record(ProviderCall::Start {
                context: context.to_string(),
                prompt: prompt.to_string(),
            });
            if let Some(message) = self.start_error.lock().unwrap().clone() {
                return Err(ProviderError::Other(message));
            }
            let mut next = self.next_id.lock().unwrap();
            let id = format!("int_{}", *next);
            *next += 1;
            Ok(id)
        })
    }

    fn check_status<'a>(
        &'a self,
        interaction_id: &'a str,
    ) -> BoxFuture<'a, Result<ResearchStatus, ProviderError>> {
        Box::pin(async move {
            self.record(ProviderCall::CheckStatus(interaction_id.to_string()));

            let delay = *self.check_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(hook) = self.on_check.lock().unwrap().as_ref() {
                hook();
            }

            match self.statuses.lock().unwrap().pop_front() {
                Some(Ok(status)) => Ok(status),
                Some(Err(message)) => Err(ProviderError::Other(message)),
                None => Ok(ResearchStatus::Running),
            }
        })
    }

    fn get_report<'a>(
        &'a self,
        interaction_id: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            self.record(ProviderCall::GetReport(interaction_id.to_string()));
            if let Some(hook) = self.on_report.lock().unwrap().as_ref() {
                hook();
            }
            self.report
                .lock()
                .unwrap()
                .clone()
                .map_err(ProviderError::Other)
        })
    }
}

/// Factory handing out one shared [`FakeProvider`].
pub struct FakeProviderFactory {
    provider: Arc<FakeProvider>,
    fail_with: Mutex<Option<String>>,
    created_from: Mutex<Vec<PathBuf>>,
}

impl FakeProviderFactory {
    pub fn new(provider: Arc<FakeProvider>) -> Self {
        Self {
            provider,
            fail_with: Mutex::new(None),
            created_from: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    /// Credential paths `create` was called with.
    pub fn created_from(&self) -> Vec<PathBuf> {
        self.created_from.lock().unwrap().clone()
    }
}

impl ProviderFactory for FakeProviderFactory {
    fn create(&self, env_file: &Path) -> Result<Arc<dyn ResearchProvider>, ProviderError> {
        self.created_from
            .lock()
            .unwrap()
            .push(env_file.to_path_buf());
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(ProviderError::Credentials(message));
        }
        Ok(self.provider.clone())
    }
}
