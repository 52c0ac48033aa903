// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;

use super::RunEvent;
use super::controller::{CheckOutcome, RunController};

/// Feeds timer ticks and shutdown requests to the [`RunController`], one at
/// a time, until the run reaches a terminal state or shutdown is requested.
///
/// This is the async IO shell around the controller: the controller decides
/// what a tick means, the runtime only owns the channel.
pub struct Runtime {
    controller: RunController,
    event_rx: mpsc::Receiver<RunEvent>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("polling", &self.controller.is_polling())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(controller: RunController, event_rx: mpsc::Receiver<RunEvent>) -> Self {
        Self {
            controller,
            event_rx,
        }
    }

    pub fn controller(&self) -> &RunController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut RunController {
        &mut self.controller
    }

    /// Main event loop.
    ///
    /// Returns the last check outcome observed, if any.
    pub async fn run(&mut self) -> Result<Option<CheckOutcome>> {
        info!("deep-research runtime started");
        let mut last = None;
        let mut deferred = None;

        while self.controller.is_polling() {
            let event = match deferred.take() {
                Some(event) => event,
                None => match self.event_rx.recv().await {
                    Some(event) => event,
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
            };
            debug!(?event, "runtime received event");

            match event {
                RunEvent::StatusTick => {
                    let notices = self.controller.progress_notice();
                    let check = self.controller.on_status_tick();
                    tokio::pin!(check);

                    // Keep serving notices while the check is in flight;
                    // anything else waits until it returns.
                    let outcome = loop {
                        tokio::select! {
                            outcome = &mut check => break outcome,
                            Some(queued) = self.event_rx.recv() => match queued {
                                RunEvent::NoticeTick => notices.emit().await,
                                other => defer(&mut deferred, other),
                            },
                        }
                    };
                    if let Some(outcome) = outcome {
                        debug!(?outcome, "status check finished");
                        last = Some(outcome);
                    }
                }
                RunEvent::NoticeTick => self.controller.on_notice_tick().await,
                RunEvent::ShutdownRequested => {
                    info!("shutdown requested");
                    self.controller.shutdown();
                    break;
                }
            }
        }

        info!("runtime exiting");
        Ok(last)
    }
}

/// Hold one event for after the current check. A shutdown request is never
/// displaced by a status tick.
fn defer(slot: &mut Option<RunEvent>, event: RunEvent) {
    if *slot != Some(RunEvent::ShutdownRequested) {
        *slot = Some(event);
    }
}
