// src/engine/scheduler.rs

//! Dual-timer polling scheduler.
//!
//! Two independent Tokio tasks push ticks into the runtime channel:
//! - the *status* ticker, every `check` interval
//! - the *notice* ticker, every `notice` interval
//!
//! Both first fire one full period after `start`. The scheduler never calls
//! into the controller itself; it only produces [`RunEvent`]s.
//!
//! At most one `StatusTick` is ever queued: if a status check is slower than
//! the check interval, the ticks that fall due meanwhile are dropped rather
//! than replayed back-to-back once the slow check returns. Notice ticks are
//! cosmetic and are dropped whenever the channel is full; the runtime keeps
//! draining them while a status check is in flight.
//!
//! The armed state is also published as a shared flag so a detached
//! [`ProgressNotice`](super::controller::ProgressNotice) can tell when the
//! timers were stopped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, trace};

use crate::config::PollIntervals;

use super::RunEvent;

#[derive(Debug)]
pub struct PollingScheduler {
    event_tx: mpsc::Sender<RunEvent>,
    status_task: Option<JoinHandle<()>>,
    notice_task: Option<JoinHandle<()>>,
    status_pending: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
}

impl PollingScheduler {
    pub fn new(event_tx: mpsc::Sender<RunEvent>) -> Self {
        Self {
            event_tx,
            status_task: None,
            notice_task: None,
            status_pending: Arc::new(AtomicBool::new(false)),
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Arm both timers. Returns `false` (and does nothing) when already armed.
    pub fn start(&mut self, intervals: PollIntervals) -> bool {
        if self.status_task.is_some() {
            return false;
        }

        self.status_pending = Arc::new(AtomicBool::new(false));
        self.status_task = Some(spawn_status_ticker(
            intervals.check,
            self.event_tx.clone(),
            Arc::clone(&self.status_pending),
        ));
        self.notice_task = Some(spawn_notice_ticker(
            intervals.notice,
            self.event_tx.clone(),
        ));
        self.armed.store(true, Ordering::Release);

        debug!(
            check_secs = intervals.check.as_secs(),
            notice_secs = intervals.notice.as_secs(),
            "polling timers armed"
        );
        true
    }

    /// Disarm both timers. Safe to call any number of times.
    pub fn stop(&mut self) {
        let was_armed = self.status_task.is_some() || self.notice_task.is_some();

        if let Some(handle) = self.status_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.notice_task.take() {
            handle.abort();
        }
        self.status_pending.store(false, Ordering::Release);
        self.armed.store(false, Ordering::Release);

        if was_armed {
            debug!("polling timers stopped");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.status_task.is_some()
    }

    /// Shared view of [`is_armed`](Self::is_armed) for detached readers.
    pub fn armed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.armed)
    }

    /// Called by the consumer when it picks a `StatusTick` off the channel,
    /// allowing the ticker to queue the next one.
    pub fn acknowledge_status_tick(&self) {
        self.status_pending.store(false, Ordering::Release);
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_status_ticker(
    period: Duration,
    tx: mpsc::Sender<RunEvent>,
    pending: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if pending.swap(true, Ordering::AcqRel) {
                trace!("previous status tick still queued; skipping");
                continue;
            }
            if tx.send(RunEvent::StatusTick).await.is_err() {
                debug!("runtime channel closed; status ticker exiting");
                break;
            }
        }
    })
}

fn spawn_notice_ticker(period: Duration, tx: mpsc::Sender<RunEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match tx.try_send(RunEvent::NoticeTick) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => trace!("runtime busy; dropping notice tick"),
                Err(TrySendError::Closed(_)) => {
                    debug!("runtime channel closed; notice ticker exiting");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intervals(check: u64, notice: u64) -> PollIntervals {
        PollIntervals {
            check: Duration::from_secs(check),
            notice: Duration::from_secs(notice),
        }
    }

    /// Drain everything that is already queued without waiting.
    fn drain(rx: &mut mpsc::Receiver<RunEvent>) -> Vec<RunEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn count(events: &[RunEvent], kind: RunEvent) -> usize {
        events.iter().filter(|e| **e == kind).count()
    }

    #[tokio::test(start_paused = true)]
    async fn first_ticks_arrive_after_one_period() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut scheduler = PollingScheduler::new(tx);
        scheduler.start(intervals(60, 5));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(drain(&mut rx), vec![RunEvent::NoticeTick]);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_arms_a_single_pair() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut scheduler = PollingScheduler::new(tx);

        assert!(scheduler.start(intervals(10, 5)));
        assert!(!scheduler.start(intervals(10, 5)));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let events = drain(&mut rx);
        assert_eq!(count(&events, RunEvent::NoticeTick), 2);
        assert_eq!(count(&events, RunEvent::StatusTick), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_silences_timers() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut scheduler = PollingScheduler::new(tx);

        scheduler.stop();
        scheduler.start(intervals(2, 1));
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_armed());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());

        // Re-arming after a stop works.
        let flag = scheduler.armed_flag();
        assert!(!flag.load(Ordering::Acquire));
        assert!(scheduler.start(intervals(2, 1)));
        assert!(scheduler.is_armed());
        assert!(flag.load(Ordering::Acquire));
    }

    #[tokio::test(start_paused = true)]
    async fn unacknowledged_status_tick_is_not_repeated() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut scheduler = PollingScheduler::new(tx);
        scheduler.start(intervals(1, 1_000));

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(count(&drain(&mut rx), RunEvent::StatusTick), 1);

        scheduler.acknowledge_status_tick();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count(&drain(&mut rx), RunEvent::StatusTick), 1);
    }
}
