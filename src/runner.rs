// src/runner.rs

use tracing::{debug, error, info, warn};

use crate::{
    actions::{Action, ActionPolicy},
    errors::ActionError,
    plans::Plan,
    report::{ActionOutcome, PlanStatus, Report},
};

/// Executes a plan's actions one at a time, in declared order.
///
/// Per action: if `is_satisfied` holds, record `already-satisfied` and move
/// on; otherwise `apply`. Failures never escape an action — a failing
/// required action aborts the remainder of its plan, a failing best-effort
/// action is recorded and skipped. The runner holds no locks and runs
/// nothing concurrently: later actions routinely depend on the side effects
/// of earlier ones.
#[derive(Debug, Default)]
pub struct PlanRunner;

impl PlanRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, plan: &Plan) -> Report {
        let mut report = Report::new(plan.name());
        report.begin();
        info!(
            "Executing plan '{}' ({} actions).",
            plan.name(),
            plan.actions().len()
        );

        for action in plan.actions() {
            match action.is_satisfied() {
                Ok(true) => {
                    debug!("'{}' is already satisfied.", action.name());
                    report.record(action.name(), ActionOutcome::AlreadySatisfied, None);
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    // A failed satisfaction probe means the action cannot
                    // verify or reach its desired state: same treatment as
                    // a failed apply.
                    if Self::record_failure(&mut report, action, &err) {
                        report.finish(PlanStatus::Aborted);
                        return report;
                    }
                    continue;
                }
            }

            match action.apply() {
                Ok(()) => {
                    info!("Applied '{}'.", action.name());
                    report.record(action.name(), ActionOutcome::Applied, None);
                }
                Err(err) => {
                    if Self::record_failure(&mut report, action, &err) {
                        report.finish(PlanStatus::Aborted);
                        return report;
                    }
                }
            }
        }

        report.finish(PlanStatus::Completed);
        report
    }

    /// Records a failure under the action's policy. Returns true when the
    /// plan must stop.
    fn record_failure(report: &mut Report, action: &Action, err: &ActionError) -> bool {
        match action.policy() {
            ActionPolicy::Required => {
                error!("Required action '{}' failed: {}", action.name(), err);
                report.record(action.name(), ActionOutcome::FailedFatal, Some(err.to_string()));
                true
            }
            ActionPolicy::BestEffort => {
                warn!("Best-effort action '{}' failed: {}", action.name(), err);
                report.record(
                    action.name(),
                    ActionOutcome::FailedRecoverable,
                    Some(err.to_string()),
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::actions::method::ActionExecutor;

    /// Executor over a shared flag: satisfied once the flag is set, apply
    /// sets it (or fails when scripted to).
    struct FlagExecutor {
        flag: Arc<AtomicBool>,
        applies: Arc<AtomicUsize>,
        fail_apply: bool,
    }

    impl ActionExecutor for FlagExecutor {
        fn is_satisfied(&self) -> Result<bool, ActionError> {
            Ok(self.flag.load(Ordering::SeqCst))
        }

        fn apply(&self) -> Result<(), ActionError> {
            self.applies.fetch_add(1, Ordering::SeqCst);
            if self.fail_apply {
                return Err(ActionError::AccessDenied("scripted failure".to_string()));
            }
            self.flag.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Executor whose apply only succeeds once a precondition flag, set by
    /// some earlier action, holds.
    struct DependentExecutor {
        precondition: Arc<AtomicBool>,
        done: Arc<AtomicBool>,
    }

    impl ActionExecutor for DependentExecutor {
        fn is_satisfied(&self) -> Result<bool, ActionError> {
            Ok(self.done.load(Ordering::SeqCst))
        }

        fn apply(&self) -> Result<(), ActionError> {
            if !self.precondition.load(Ordering::SeqCst) {
                return Err(ActionError::NotFound("precondition unmet".to_string()));
            }
            self.done.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Harness {
        flag: Arc<AtomicBool>,
        applies: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new(initially_satisfied: bool) -> Self {
            Self {
                flag: Arc::new(AtomicBool::new(initially_satisfied)),
                applies: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn action(&self, name: &str, policy: ActionPolicy, fail_apply: bool) -> Action {
            Action::new(
                name,
                policy,
                Arc::new(FlagExecutor {
                    flag: self.flag.clone(),
                    applies: self.applies.clone(),
                    fail_apply,
                }),
            )
        }

        fn apply_count(&self) -> usize {
            self.applies.load(Ordering::SeqCst)
        }
    }

    fn outcomes(report: &Report) -> Vec<ActionOutcome> {
        report.records().iter().map(|record| record.outcome).collect()
    }

    #[test]
    fn satisfied_actions_are_not_reapplied() {
        let running = Harness::new(true);
        let missing = Harness::new(true);
        let plan = Plan::new(
            "noop",
            "already in desired state",
            vec![
                running.action("stop process 'notepad'", ActionPolicy::BestEffort, false),
                missing.action("delete path 'C:\\temp\\notepad_lock'", ActionPolicy::BestEffort, false),
            ],
        );

        let report = PlanRunner::new().execute(&plan);

        assert_eq!(
            outcomes(&report),
            vec![ActionOutcome::AlreadySatisfied, ActionOutcome::AlreadySatisfied]
        );
        assert!(report.success());
        assert_eq!(report.status(), PlanStatus::Completed);
        assert_eq!(running.apply_count() + missing.apply_count(), 0);
    }

    #[test]
    fn second_run_of_an_applied_plan_reports_already_satisfied() {
        let harness = Harness::new(false);
        let plan = Plan::new(
            "flag",
            "set a value",
            vec![harness.action("set Flag=1", ActionPolicy::Required, false)],
        );
        let runner = PlanRunner::new();

        let first = runner.execute(&plan);
        assert_eq!(outcomes(&first), vec![ActionOutcome::Applied]);

        let second = runner.execute(&plan);
        assert_eq!(outcomes(&second), vec![ActionOutcome::AlreadySatisfied]);
        assert_eq!(harness.apply_count(), 1, "apply must run exactly once");
    }

    #[test]
    fn best_effort_failure_is_isolated() {
        let harnesses: Vec<Harness> = (0..5).map(|_| Harness::new(false)).collect();
        let actions = harnesses
            .iter()
            .enumerate()
            .map(|(i, h)| h.action(&format!("step {}", i + 1), ActionPolicy::BestEffort, i == 2))
            .collect();
        let plan = Plan::new("sweep", "five best-effort steps", actions);

        let report = PlanRunner::new().execute(&plan);

        assert_eq!(
            outcomes(&report),
            vec![
                ActionOutcome::Applied,
                ActionOutcome::Applied,
                ActionOutcome::FailedRecoverable,
                ActionOutcome::Applied,
                ActionOutcome::Applied,
            ]
        );
        assert!(report.success(), "no required action failed");
        assert_eq!(report.status(), PlanStatus::Completed);
        assert_eq!(harnesses[3].apply_count(), 1);
        assert_eq!(harnesses[4].apply_count(), 1);
    }

    #[test]
    fn required_failure_aborts_the_remainder() {
        let first = Harness::new(false);
        let failing = Harness::new(false);
        let never_reached = Harness::new(false);
        let plan = Plan::new(
            "abort",
            "required step fails",
            vec![
                first.action("stop service", ActionPolicy::BestEffort, false),
                failing.action("replace binary", ActionPolicy::Required, true),
                never_reached.action("restart service", ActionPolicy::Required, false),
            ],
        );

        let report = PlanRunner::new().execute(&plan);

        assert_eq!(
            outcomes(&report),
            vec![ActionOutcome::Applied, ActionOutcome::FailedFatal]
        );
        assert!(!report.success());
        assert_eq!(report.status(), PlanStatus::Aborted);
        assert_eq!(never_reached.apply_count(), 0);
        let fatal = &report.records()[1];
        assert!(fatal.detail.as_deref().unwrap().contains("scripted failure"));
    }

    #[test]
    fn declared_order_carries_dependencies() {
        let precondition = Arc::new(AtomicBool::new(false));
        let stop = Action::new(
            "stop process",
            ActionPolicy::BestEffort,
            Arc::new(FlagExecutor {
                flag: precondition.clone(),
                applies: Arc::new(AtomicUsize::new(0)),
                fail_apply: false,
            }),
        );
        let delete = Action::new(
            "delete install folder",
            ActionPolicy::BestEffort,
            Arc::new(DependentExecutor {
                precondition: precondition.clone(),
                done: Arc::new(AtomicBool::new(false)),
            }),
        );

        let ordered = Plan::new("ordered", "stop then delete", vec![stop.clone(), delete.clone()]);
        let report = PlanRunner::new().execute(&ordered);
        assert_eq!(
            outcomes(&report),
            vec![ActionOutcome::Applied, ActionOutcome::Applied]
        );

        // Swapped, the dependent action runs first and finds its
        // precondition unmet.
        precondition.store(false, Ordering::SeqCst);
        let delete_first = Action::new(
            "delete install folder",
            ActionPolicy::BestEffort,
            Arc::new(DependentExecutor {
                precondition: precondition.clone(),
                done: Arc::new(AtomicBool::new(false)),
            }),
        );
        let swapped = Plan::new("swapped", "delete then stop", vec![delete_first, stop]);
        let report = PlanRunner::new().execute(&swapped);
        assert_eq!(
            outcomes(&report),
            vec![ActionOutcome::FailedRecoverable, ActionOutcome::Applied]
        );
        assert!(report.records()[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("precondition unmet"));
    }

    #[test]
    fn probe_errors_follow_the_action_policy() {
        struct BrokenProbe;
        impl ActionExecutor for BrokenProbe {
            fn is_satisfied(&self) -> Result<bool, ActionError> {
                Err(ActionError::InvalidTarget("BAD\\PATH".to_string()))
            }
            fn apply(&self) -> Result<(), ActionError> {
                unreachable!("apply must not run after a failed probe")
            }
        }

        let tail = Harness::new(false);
        let plan = Plan::new(
            "probe",
            "broken probe first",
            vec![
                Action::new("broken", ActionPolicy::BestEffort, Arc::new(BrokenProbe)),
                tail.action("tail", ActionPolicy::BestEffort, false),
            ],
        );

        let report = PlanRunner::new().execute(&plan);
        assert_eq!(
            outcomes(&report),
            vec![ActionOutcome::FailedRecoverable, ActionOutcome::Applied]
        );

        let plan = Plan::new(
            "probe-required",
            "broken probe, required",
            vec![
                Action::new("broken", ActionPolicy::Required, Arc::new(BrokenProbe)),
                Harness::new(false).action("tail", ActionPolicy::BestEffort, false),
            ],
        );
        let report = PlanRunner::new().execute(&plan);
        assert_eq!(outcomes(&report), vec![ActionOutcome::FailedFatal]);
        assert_eq!(report.status(), PlanStatus::Aborted);
    }
}
