//! Close-eligibility evaluation
//!
//! Recomputes the derived `can_*` flags and check results for an ordered
//! fiscal year. The check is local: an open period is eligible for soft close
//! only when it is the first period or its predecessor is hard-closed.

use crate::model::{CheckResult, CloseStatus, PeriodCloseStatus};

pub const MSG_FIRST_PERIOD: &str = "first period of the fiscal year";
pub const MSG_PREVIOUS_CLOSED: &str = "previous month is hard-closed";
pub const MSG_PREVIOUS_NOT_CLOSED: &str = "previous month is not hard-closed";

/// Recompute derived eligibility for all periods of one fiscal year.
///
/// `periods` must be ordered by `period_no`. Pure with respect to everything
/// but the derived fields; no clock, no I/O.
pub fn evaluate(periods: &mut [PeriodCloseStatus]) {
    let statuses: Vec<CloseStatus> = periods.iter().map(|p| p.close_status).collect();

    for (index, period) in periods.iter_mut().enumerate() {
        period.can_hard_close = period.close_status == CloseStatus::SoftClosed;
        period.can_reopen = period.close_status == CloseStatus::SoftClosed;

        if period.close_status != CloseStatus::Open {
            period.can_soft_close = false;
            period.check_results.clear();
            continue;
        }

        let predecessor_closed =
            index > 0 && statuses[index - 1] == CloseStatus::HardClosed;
        let passed = index == 0 || predecessor_closed;

        let message = if index == 0 {
            MSG_FIRST_PERIOD
        } else if predecessor_closed {
            MSG_PREVIOUS_CLOSED
        } else {
            MSG_PREVIOUS_NOT_CLOSED
        };

        period.can_soft_close = passed;
        period.check_results = vec![CheckResult::previous_month_closed(passed, message)];
    }
}
