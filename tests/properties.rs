// tests/properties.rs

mod common;
use crate::common::{Harness, SettingsBuilder};

use proptest::prelude::*;

use deep_research::engine::CheckOutcome;
use deep_research::provider::ResearchStatus;
use deep_research::vault::Subject;

#[derive(Debug, Clone)]
enum Op {
    Start(usize),
    Abandon,
    Check(Scripted),
    Notice,
}

#[derive(Debug, Clone)]
enum Scripted {
    Running,
    Error,
    Completed,
    Failed,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..2usize).prop_map(Op::Start),
        Just(Op::Abandon),
        prop_oneof![
            3 => Just(Scripted::Running),
            2 => Just(Scripted::Error),
            1 => Just(Scripted::Completed),
            1 => Just(Scripted::Failed),
        ]
        .prop_map(Op::Check),
        Just(Op::Notice),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

const NOTES: [&str; 2] = ["Notes/noteA.md", "Notes/noteB.md"];

proptest! {
    /// The store holds at most one record, a start never succeeds while one
    /// is present, and the timers are armed exactly while a record exists.
    #[test]
    fn single_run_and_timers_track_the_record(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let rt = runtime();
        rt.block_on(async {
            let h = Harness::new();
            let (mut controller, _rx) = h.controller(SettingsBuilder::new().build());

            for op in ops {
                let before = h.store.current();
                match op {
                    Op::Start(i) => {
                        let result = controller.start_research(&Subject::from_path(NOTES[i])).await;
                        if before.is_some() {
                            prop_assert!(result.is_err());
                            prop_assert_eq!(h.store.current(), before);
                        } else {
                            prop_assert!(result.is_ok());
                        }
                    }
                    Op::Abandon => {
                        let abandoned = controller.reset_abandon_run().await.unwrap();
                        prop_assert_eq!(abandoned, before);
                        prop_assert!(h.store.current().is_none());
                    }
                    Op::Check(scripted) => {
                        match scripted {
                            Scripted::Running => h.provider.push_status(ResearchStatus::Running),
                            Scripted::Error => h.provider.push_status_error("timeout"),
                            Scripted::Completed => h.provider.push_status(ResearchStatus::Completed {
                                report: Some("# R".to_string()),
                            }),
                            Scripted::Failed => h.provider.push_status(ResearchStatus::Failed {
                                error: "quota exceeded".to_string(),
                            }),
                        }
                        match controller.on_status_tick().await {
                            None => prop_assert!(before.is_none()),
                            Some(CheckOutcome::Running) | Some(CheckOutcome::Unobserved) => {
                                prop_assert_eq!(h.store.current(), before);
                            }
                            Some(CheckOutcome::Completed { .. }) | Some(CheckOutcome::Failed { .. }) => {
                                prop_assert!(h.store.current().is_none());
                            }
                            Some(other) => prop_assert!(false, "unexpected outcome {:?}", other),
                        }
                    }
                    Op::Notice => {
                        controller.on_notice_tick().await;
                        prop_assert_eq!(h.store.current(), before);
                    }
                }
                prop_assert_eq!(controller.is_polling(), h.store.current().is_some());
            }
            Ok(())
        })?;
    }

    /// Completing the same subject repeatedly leaves one report holding the
    /// latest text.
    #[test]
    fn repeated_completion_overwrites_the_report(reports in proptest::collection::vec("[a-z]{1,12}", 1..5)) {
        let rt = runtime();
        rt.block_on(async {
            let h = Harness::new();
            let (mut controller, _rx) = h.controller(SettingsBuilder::new().build());

            for text in &reports {
                controller.start_research(&Subject::from_path(NOTES[0])).await.unwrap();
                h.provider.push_status(ResearchStatus::Completed { report: Some(text.clone()) });
                let outcome = controller.check_run_status().await;
                let completed = matches!(outcome, CheckOutcome::Completed { saved_to: Some(_) });
                prop_assert!(completed);
            }

            let report = h.report("noteA").unwrap();
            let last = reports.last().unwrap();
            prop_assert!(report.ends_with(last.as_str()));
            // prompt, two notes, journal, one report
            prop_assert_eq!(h.fs.file_count(), 5);
            Ok(())
        })?;
    }
}
