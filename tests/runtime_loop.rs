// tests/runtime_loop.rs
//
// These run on tokio's paused clock, which auto-advances to the next timer
// whenever every task is idle.

mod common;
use crate::common::{Harness, ProviderCall, SettingsBuilder, init_tracing, note_a, persisted_run};

use std::time::Duration;

use deep_research::engine::{CheckOutcome, RunController, RunEvent, Runtime};
use deep_research::provider::ResearchStatus;

#[tokio::test(start_paused = true)]
async fn runtime_polls_until_completion() {
    init_tracing();
    let h = Harness::new();
    let settings = SettingsBuilder::new()
        .check_interval_secs(60)
        .notice_interval_secs(5)
        .build();
    let (mut controller, rx) = h.controller(settings);
    controller.start_research(&note_a()).await.unwrap();

    h.provider.push_status(ResearchStatus::Running);
    h.provider.push_status(ResearchStatus::Running);
    h.provider.push_status(ResearchStatus::Completed {
        report: Some("# R".to_string()),
    });

    let mut runtime = Runtime::new(controller, rx);
    let outcome = runtime.run().await.unwrap();

    assert!(matches!(outcome, Some(CheckOutcome::Completed { saved_to: Some(_) })));
    assert_eq!(h.provider.check_calls(), 3);
    assert!(h.store.current().is_none());
    assert!(h.report("noteA").is_some());

    // Notices at 5s steps up to the completing check at 180s (the notice
    // that shares the 180s instant may or may not win the race).
    let notices = h.notifier.count_containing("in progress for noteA");
    assert!((35..=36).contains(&notices), "got {notices} notices");
}

#[tokio::test(start_paused = true)]
async fn shutdown_request_stops_polling_and_keeps_record() {
    init_tracing();
    let h = Harness::new();
    let (tx, rx) = tokio::sync::mpsc::channel(64);
    let mut controller =
        RunController::new(SettingsBuilder::new().build(), h.collaborators(), tx.clone());
    controller.start_research(&note_a()).await.unwrap();

    tx.send(RunEvent::ShutdownRequested).await.unwrap();
    let mut runtime = Runtime::new(controller, rx);
    let outcome = runtime.run().await.unwrap();

    assert_eq!(outcome, None);
    assert!(!runtime.controller().is_polling());
    assert!(h.store.current().is_some());
    assert_eq!(h.provider.check_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_resumes_polling_of_a_persisted_run() {
    init_tracing();
    let h = Harness::new();
    h.store
        .replace(Some(persisted_run("int_7", "Notes/noteA.md")));
    h.provider.push_status(ResearchStatus::Failed {
        error: "agent crashed".to_string(),
    });

    let (mut controller, rx) = h.controller(SettingsBuilder::new().check_interval_secs(10).build());
    assert!(controller.start_polling().await.unwrap());
    let mut runtime = Runtime::new(controller, rx);
    let outcome = runtime.run().await.unwrap();

    assert_eq!(
        outcome,
        Some(CheckOutcome::Failed {
            error: "agent crashed".to_string()
        })
    );
    assert_eq!(
        h.provider.calls(),
        vec![ProviderCall::CheckStatus("int_7".to_string())]
    );
    assert!(h.store.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_checks_never_overlap() {
    init_tracing();
    let h = Harness::new();
    // Each check takes longer than the check interval.
    h.provider.set_check_delay(Duration::from_secs(25));
    h.provider.push_status(ResearchStatus::Running);
    h.provider.push_status(ResearchStatus::Running);
    h.provider.push_status(ResearchStatus::Failed {
        error: "gave up".to_string(),
    });

    let (mut controller, rx) = h.controller(
        SettingsBuilder::new()
            .check_interval_secs(10)
            .notice_interval_secs(5)
            .build(),
    );
    controller.start_research(&note_a()).await.unwrap();
    let mut runtime = Runtime::new(controller, rx);
    let outcome = runtime.run().await.unwrap();

    assert!(matches!(outcome, Some(CheckOutcome::Failed { .. })));
    // Exactly one check per status tick that was handled; missed ticks were
    // skipped rather than replayed.
    assert_eq!(h.provider.check_calls(), 3);
    assert_eq!(h.notifier.count_containing("gave up"), 1);
    // Checks end at 35s, 60s and 85s; notices kept their 5s cadence.
    let notices = h.notifier.count_containing("in progress for noteA");
    assert!((16..=17).contains(&notices), "got {notices} notices");
}

#[tokio::test(start_paused = true)]
async fn notices_keep_their_cadence_during_a_slow_check() {
    init_tracing();
    let h = Harness::new();
    h.provider.set_check_delay(Duration::from_secs(60));
    h.provider.push_status(ResearchStatus::Running);
    h.provider.push_status(ResearchStatus::Failed {
        error: "gave up".to_string(),
    });

    let (mut controller, rx) = h.controller(
        SettingsBuilder::new()
            .check_interval_secs(60)
            .notice_interval_secs(5)
            .build(),
    );
    controller.start_research(&note_a()).await.unwrap();
    let mut runtime = Runtime::new(controller, rx);

    let notices = || h.notifier.count_containing("in progress for noteA");
    let observe = async {
        // The first check runs from 60s to 120s.
        tokio::time::sleep(Duration::from_millis(59_500)).await;
        let before_check = notices();
        tokio::time::sleep(Duration::from_secs(60)).await;
        let end_of_check = notices();
        tokio::time::sleep(Duration::from_secs(1)).await;
        (before_check, end_of_check, notices())
    };
    let (outcome, (before_check, end_of_check, after_check)) =
        tokio::join!(runtime.run(), observe);

    assert!(matches!(outcome.unwrap(), Some(CheckOutcome::Failed { .. })));
    assert_eq!(before_check, 11);
    assert_eq!(end_of_check, 23);
    // No burst once the check returns: just the 120s notice.
    assert_eq!(after_check, 24);
}

#[tokio::test(start_paused = true)]
async fn abandonment_between_ticks_ends_the_loop() {
    init_tracing();
    let h = Harness::new();
    let (mut controller, rx) = h.controller(SettingsBuilder::new().check_interval_secs(10).build());
    controller.start_research(&note_a()).await.unwrap();

    // Another process clears the record.
    h.store.replace(None);

    let mut runtime = Runtime::new(controller, rx);
    let outcome = runtime.run().await.unwrap();

    assert_eq!(outcome, Some(CheckOutcome::Stopped));
    assert_eq!(h.provider.check_calls(), 0);
}
