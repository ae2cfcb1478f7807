use kessan_core::model::{
    AllocationRuleResult, CheckType, ExpectedAllocation, ExpectedPeriod, PeriodCloseStatus,
};
use serde::Serialize;

const AMOUNT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    StepOutcome,
    PeriodState,
    Allocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    pub kind: MismatchKind,
    pub detail: String,
}

impl Mismatch {
    pub fn step(step_no: usize, detail: String) -> Self {
        Self {
            kind: MismatchKind::StepOutcome,
            detail: format!("step {step_no}: {detail}"),
        }
    }

    fn period(period_no: i32, detail: String) -> Self {
        Self {
            kind: MismatchKind::PeriodState,
            detail: format!("period {period_no}: {detail}"),
        }
    }

    fn allocation(rule_name: &str, detail: String) -> Self {
        Self {
            kind: MismatchKind::Allocation,
            detail: format!("rule '{rule_name}': {detail}"),
        }
    }
}

/// Diff the final period states against the scenario's expectations.
pub fn compare_periods(
    actual: &[PeriodCloseStatus],
    expected: &[ExpectedPeriod],
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for expectation in expected {
        let Some(period) = actual
            .iter()
            .find(|period| period.period_no == expectation.period_no)
        else {
            mismatches.push(Mismatch::period(
                expectation.period_no,
                "missing from final state".to_string(),
            ));
            continue;
        };

        if period.close_status != expectation.status {
            mismatches.push(Mismatch::period(
                expectation.period_no,
                format!(
                    "expected status {} but found {}",
                    expectation.status, period.close_status
                ),
            ));
        }

        check_flag(
            &mut mismatches,
            expectation.period_no,
            "can_soft_close",
            expectation.can_soft_close,
            period.can_soft_close,
        );
        check_flag(
            &mut mismatches,
            expectation.period_no,
            "can_hard_close",
            expectation.can_hard_close,
            period.can_hard_close,
        );
        check_flag(
            &mut mismatches,
            expectation.period_no,
            "can_reopen",
            expectation.can_reopen,
            period.can_reopen,
        );

        if let Some(expected_passed) = expectation.check_passed {
            let actual_passed = period
                .check_results
                .iter()
                .find(|check| check.check_type == CheckType::PreviousMonthClosed)
                .map(|check| check.passed);
            if actual_passed != Some(expected_passed) {
                mismatches.push(Mismatch::period(
                    expectation.period_no,
                    format!(
                        "expected previous-month check passed={expected_passed} but found {actual_passed:?}"
                    ),
                ));
            }
        }
    }

    mismatches
}

/// Diff allocation rule results against the scenario's expectations, keyed by
/// rule name.
pub fn compare_allocations(
    actual: &[AllocationRuleResult],
    expected: &[ExpectedAllocation],
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for expectation in expected {
        let Some(result) = actual
            .iter()
            .find(|result| result.rule_name == expectation.rule_name)
        else {
            mismatches.push(Mismatch::allocation(
                &expectation.rule_name,
                "no result reported".to_string(),
            ));
            continue;
        };

        if (result.source_amount - expectation.source_amount).abs() > AMOUNT_TOLERANCE {
            mismatches.push(Mismatch::allocation(
                &expectation.rule_name,
                format!(
                    "expected source_amount {} but found {}",
                    expectation.source_amount, result.source_amount
                ),
            ));
        }
        if (result.allocated_amount - expectation.allocated_amount).abs() > AMOUNT_TOLERANCE {
            mismatches.push(Mismatch::allocation(
                &expectation.rule_name,
                format!(
                    "expected allocated_amount {} but found {}",
                    expectation.allocated_amount, result.allocated_amount
                ),
            ));
        }
        if result.target_count != expectation.target_count {
            mismatches.push(Mismatch::allocation(
                &expectation.rule_name,
                format!(
                    "expected target_count {} but found {}",
                    expectation.target_count, result.target_count
                ),
            ));
        }
    }

    mismatches
}

fn check_flag(
    mismatches: &mut Vec<Mismatch>,
    period_no: i32,
    name: &str,
    expected: Option<bool>,
    actual: bool,
) {
    if let Some(expected) = expected {
        if expected != actual {
            mismatches.push(Mismatch::period(
                period_no,
                format!("expected {name}={expected} but found {actual}"),
            ));
        }
    }
}
