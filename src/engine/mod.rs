// src/engine/mod.rs

//! Run-lifecycle engine.
//!
//! This module ties together:
//! - the polling scheduler (two independent timers)
//! - the run controller (the single-run state machine)
//! - the runtime event loop that feeds timer ticks and shutdown requests to
//!   the controller one at a time
//!
//! All timer output goes through one `mpsc` channel. Status checks run one
//! at a time; progress notices that arrive during a slow check are handled
//! while it is still in flight, so a slow provider only delays its own timer.

/// Events flowing into the runtime from the timers and signal handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// The status timer fired: ask the provider how the run is doing.
    StatusTick,
    /// The notice timer fired: remind the user a run is in progress.
    NoticeTick,
    /// Graceful shutdown requested (e.g. Ctrl-C). Polling stops; the
    /// persisted run is kept for a later resume.
    ShutdownRequested,
}

pub mod controller;
pub mod runtime;
pub mod scheduler;

pub use controller::{CheckOutcome, Collaborators, ProgressNotice, RunController};
pub use runtime::Runtime;
pub use scheduler::PollingScheduler;
