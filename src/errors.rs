// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Two layers:
//! - [`ResearchError`] covers plumbing (config, IO, persistence) and is what
//!   `Result<T>` means throughout the crate.
//! - [`RunError`] is what the run controller's operations fail with. Each
//!   variant knows its journal reason code and whether it should reach the
//!   user, so the controller never has to guess at a call site.

use thiserror::Error;

use crate::types::{ReasonCode, Visibility};

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Failure of a run-controller operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Deep research is disabled in settings.")]
    Disabled,

    #[error("Deep research prompt path is not configured.")]
    PromptPathMissing,

    #[error("Deep research .env file path is not configured.")]
    EnvPathMissing,

    #[error("Deep Research is already running for {subject}. Please reset/abandon first.")]
    Busy { subject: String },

    #[error("Failed to initialize provider: {0}")]
    ProviderInit(String),

    #[error("Failed to read prompt file: {0}")]
    PromptRead(String),

    #[error("Failed to read active note: {0}")]
    NoteRead(String),

    #[error("Failed to start deep research session: {0}")]
    StartRequest(String),

    #[error("Failed to persist run state: {0}")]
    Persist(String),

    #[error("Status check failed: {0}")]
    StatusCheck(String),

    #[error("Deep Research completed but failed to save report: {0}")]
    ReportNotSaved(String),
}

impl RunError {
    /// Reason code written to the journal for this failure.
    pub fn reason(&self) -> ReasonCode {
        match self {
            RunError::Disabled => ReasonCode::Disabled,
            RunError::PromptPathMissing => ReasonCode::PromptPathMissing,
            RunError::EnvPathMissing => ReasonCode::EnvPathMissing,
            RunError::Busy { .. } => ReasonCode::Busy,
            RunError::ProviderInit(_) => ReasonCode::InitFailed,
            RunError::PromptRead(_) => ReasonCode::PromptReadFailed,
            RunError::NoteRead(_) => ReasonCode::NoteReadFailed,
            RunError::StartRequest(_) => ReasonCode::RequestFailed,
            RunError::Persist(_) => ReasonCode::PersistFailed,
            RunError::StatusCheck(_) => ReasonCode::CheckFailed,
            RunError::ReportNotSaved(_) => ReasonCode::WriteFailed,
        }
    }

    /// Whether the failure is shown to the user or only journaled.
    ///
    /// A status check that could not observe the job is not a job failure;
    /// it must never interrupt a run the user is waiting on.
    pub fn visibility(&self) -> Visibility {
        match self {
            RunError::StatusCheck(_) => Visibility::Silent,
            _ => Visibility::UserFacing,
        }
    }

    /// Line written to the journal after the reason code.
    pub fn journal_message(&self) -> String {
        match self {
            RunError::Disabled => "Deep Research is disabled".to_string(),
            RunError::PromptPathMissing => "Prompt path missing".to_string(),
            RunError::EnvPathMissing => "Env file path missing".to_string(),
            RunError::Busy { subject } => format!("Start rejected; run active for {subject}"),
            RunError::ProviderInit(e) => format!("Provider init failed: {e}"),
            RunError::PromptRead(e) => format!("Read prompt failed: {e}"),
            RunError::NoteRead(e) => format!("Read note failed: {e}"),
            RunError::StartRequest(e) => format!("Start request failed: {e}"),
            RunError::Persist(e) => format!("Persisting run state failed: {e}"),
            RunError::StatusCheck(e) => format!("Check status failed: {e}"),
            RunError::ReportNotSaved(e) => format!("Write failed: {e}"),
        }
    }
}
