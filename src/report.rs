// src/report.rs

use strum_macros::{Display, EnumIter};

/// Outcome of a single action within a plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum ActionOutcome {
    /// The action changed system state to reach the desired state.
    #[strum(serialize = "applied")]
    Applied,
    /// The desired state already held; nothing was changed.
    #[strum(serialize = "already-satisfied")]
    AlreadySatisfied,
    /// A best-effort action failed; the plan continued.
    #[strum(serialize = "failed-recoverable")]
    FailedRecoverable,
    /// A required action failed; the plan was aborted.
    #[strum(serialize = "failed-fatal")]
    FailedFatal,
}

/// Lifecycle of a plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlanStatus {
    Pending,
    Running,
    Completed,
    Aborted,
}

/// One `(action, outcome, detail)` entry, in execution order.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub action: String,
    pub outcome: ActionOutcome,
    pub detail: Option<String>,
}

/// Structured outcome of one plan execution.
///
/// Built up by the runner, read-only for everyone else. Overall success
/// means no required action failed, which is exactly the absence of a
/// `FailedFatal` record.
#[derive(Debug)]
pub struct Report {
    plan: String,
    status: PlanStatus,
    records: Vec<ActionRecord>,
}

impl Report {
    pub(crate) fn new(plan: &str) -> Self {
        Self {
            plan: plan.to_string(),
            status: PlanStatus::Pending,
            records: Vec::new(),
        }
    }

    pub(crate) fn begin(&mut self) {
        self.status = PlanStatus::Running;
    }

    pub(crate) fn record(&mut self, action: &str, outcome: ActionOutcome, detail: Option<String>) {
        self.records.push(ActionRecord {
            action: action.to_string(),
            outcome,
            detail,
        });
    }

    pub(crate) fn finish(&mut self, status: PlanStatus) {
        self.status = status;
    }

    pub fn plan(&self) -> &str {
        &self.plan
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// Number of records with the given outcome.
    pub fn count(&self, outcome: ActionOutcome) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome == outcome)
            .count()
    }

    pub fn success(&self) -> bool {
        self.count(ActionOutcome::FailedFatal) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_partition_the_records() {
        let mut report = Report::new("counts");
        report.begin();
        report.record("a", ActionOutcome::Applied, None);
        report.record("b", ActionOutcome::AlreadySatisfied, None);
        report.record("c", ActionOutcome::FailedRecoverable, Some("boom".to_string()));
        report.record("d", ActionOutcome::Applied, None);
        report.finish(PlanStatus::Completed);

        assert_eq!(report.count(ActionOutcome::Applied), 2);
        assert_eq!(report.count(ActionOutcome::AlreadySatisfied), 1);
        assert_eq!(report.count(ActionOutcome::FailedRecoverable), 1);
        assert_eq!(report.count(ActionOutcome::FailedFatal), 0);
        assert_eq!(report.records().len(), 4);
    }

    #[test]
    fn recoverable_failures_do_not_spoil_success() {
        let mut report = Report::new("recoverable");
        report.begin();
        report.record("a", ActionOutcome::FailedRecoverable, None);
        report.finish(PlanStatus::Completed);
        assert!(report.success());
    }

    #[test]
    fn a_fatal_failure_spoils_success() {
        let mut report = Report::new("fatal");
        report.begin();
        report.record("a", ActionOutcome::Applied, None);
        report.record("b", ActionOutcome::FailedFatal, Some("denied".to_string()));
        report.finish(PlanStatus::Aborted);
        assert!(!report.success());
        assert_eq!(report.status(), PlanStatus::Aborted);
    }

    #[test]
    fn outcomes_render_in_kebab_case() {
        assert_eq!(ActionOutcome::AlreadySatisfied.to_string(), "already-satisfied");
        assert_eq!(ActionOutcome::FailedFatal.to_string(), "failed-fatal");
    }
}
