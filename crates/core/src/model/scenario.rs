use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::allocation::AllocationRule;
use crate::model::period::CloseStatus;

/// A replayable close scenario: an initial fiscal-year state, a sequence of
/// close operations, and the expected outcome. Consumed by the CLI harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseScenario {
    /// Human-readable scenario name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub company_id: String,

    pub fiscal_year: i32,

    /// Initial close status per period; unlisted periods are not created.
    pub periods: Vec<ScenarioPeriod>,

    /// Ledger lines backing allocation steps (account, department, amount).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ledger: Vec<LedgerLine>,

    /// Allocation rules executed by `allocate` steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<AllocationRule>,

    /// Close operations applied in order.
    pub steps: Vec<ScenarioStep>,

    /// Expected final state.
    pub expected: ScenarioExpectation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioPeriod {
    pub period_no: i32,
    #[serde(default = "default_status")]
    pub status: CloseStatus,
}

fn default_status() -> CloseStatus {
    CloseStatus::Open
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLine {
    pub account: String,
    pub department: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    SoftClose,
    HardClose,
    Reopen,
    Allocate,
}

/// Business error kinds a step may expect instead of success.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedError {
    PeriodNotFound,
    AlreadyClosed,
    NotSoftClosed,
    CheckFailed,
    AllocationPreconditionFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub action: StepAction,
    pub period_no: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Only meaningful for `allocate` steps.
    #[serde(default)]
    pub dry_run: bool,
    /// When set, the step must fail with this error kind; the harness treats
    /// success (or a different error) as a scenario failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_error: Option<ExpectedError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioExpectation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub periods: Vec<ExpectedPeriod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allocations: Vec<ExpectedAllocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedPeriod {
    pub period_no: i32,
    pub status: CloseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_soft_close: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_hard_close: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_reopen: Option<bool>,
    /// Expected `passed` flag of the previous-month-closed check entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_passed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedAllocation {
    pub rule_name: String,
    pub source_amount: f64,
    pub allocated_amount: f64,
    pub target_count: usize,
}

impl CloseScenario {
    /// Structural validation before execution.
    pub fn validate(&self) -> Result<()> {
        if self.periods.is_empty() {
            bail!("scenario must define at least one period");
        }

        let mut seen = HashSet::new();
        for period in &self.periods {
            if !(1..=12).contains(&period.period_no) {
                bail!(
                    "period_no {} is out of range (expected 1..=12)",
                    period.period_no
                );
            }
            if !seen.insert(period.period_no) {
                bail!("duplicate period_no {} in scenario periods", period.period_no);
            }
        }

        for step in &self.steps {
            // A step may reference a missing period only when it expects the
            // not-found rejection.
            if !seen.contains(&step.period_no)
                && step.expect_error != Some(ExpectedError::PeriodNotFound)
            {
                bail!(
                    "step references period_no {} which is not defined",
                    step.period_no
                );
            }
            if step.action == StepAction::Allocate && self.rules.is_empty() {
                bail!("allocate step requires at least one allocation rule");
            }
        }

        for rule in &self.rules {
            if rule.targets.is_empty() {
                bail!("allocation rule '{}' has no targets", rule.name);
            }
        }

        for expected in &self.expected.periods {
            if !seen.contains(&expected.period_no) {
                bail!(
                    "expected period_no {} is not defined in scenario periods",
                    expected.period_no
                );
            }
        }

        Ok(())
    }
}
