// src/provider/mod.rs

//! The remote research service.
//!
//! The controller only ever talks to a [`ResearchProvider`]. Production uses
//! [`gemini::GeminiProvider`]; tests provide their own implementation that
//! scripts responses and records calls.
//!
//! Providers are built by a [`ProviderFactory`] from the credential file, so
//! a process that finds a persisted run after a restart can rebuild one
//! before polling.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::types::BoxFuture;

pub mod credentials;
pub mod gemini;

pub use credentials::Credentials;
pub use gemini::{GeminiProvider, GeminiProviderFactory};

/// Outcome of one status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchStatus {
    Running,
    /// `report` is filled when the status response already carried it.
    Completed { report: Option<String> },
    Failed { error: String },
}

/// Errors raised by providers and their factories.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// Credential file missing, unreadable or incomplete.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// A report was requested for a job that has not completed.
    #[error("interaction {id} is not completed (status: {status})")]
    NotCompleted { id: String, status: String },

    /// The job completed without any report text.
    #[error("interaction {0} completed with an empty report")]
    EmptyReport(String),

    #[error("{0}")]
    Other(String),
}

/// Remote operations the controller needs.
pub trait ResearchProvider: Send + Sync {
    /// Start a job over `context` (the note) with `prompt`; returns its handle.
    fn start<'a>(
        &'a self,
        context: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;

    fn check_status<'a>(
        &'a self,
        interaction_id: &'a str,
    ) -> BoxFuture<'a, Result<ResearchStatus, ProviderError>>;

    /// Fetch the final report. Fails unless the job completed with content.
    fn get_report<'a>(
        &'a self,
        interaction_id: &'a str,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;
}

/// Builds providers from the configured credential file.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, env_file: &Path) -> Result<Arc<dyn ResearchProvider>, ProviderError>;
}
