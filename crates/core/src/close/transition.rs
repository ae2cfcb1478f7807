//! Close status transitions
//!
//! Arena-style executors: each transition mutates the loaded, ordered period
//! list in memory and re-evaluates eligibility for the whole year, so the
//! caller can persist the target and its affected neighbour as one batch.
//! Rejections are typed and leave the list untouched.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::close::eligibility::evaluate;
use crate::model::{CloseStatus, PeriodCloseStatus, PeriodStoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("period '{period_id}' not found")]
    PeriodNotFound { period_id: Uuid },
    #[error("period is already closed (current status: {status})")]
    AlreadyClosed { status: CloseStatus },
    #[error("period is not soft-closed (current status: {status})")]
    NotSoftClosed { status: CloseStatus },
    #[error("close check failed: {message}")]
    CheckFailed { message: String },
    #[error(transparent)]
    Store(#[from] PeriodStoreError),
}

/// `Open` -> `SoftClosed`, gated by the previous-month-closed check.
pub fn soft_close(
    periods: &mut [PeriodCloseStatus],
    period_id: &Uuid,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    evaluate(periods);

    let index = find_period(periods, period_id)?;
    let period = &periods[index];

    if period.close_status != CloseStatus::Open {
        return Err(TransitionError::AlreadyClosed {
            status: period.close_status,
        });
    }
    if !period.can_soft_close {
        let message = period
            .check_results
            .iter()
            .find(|check| !check.passed)
            .map(|check| check.message.clone())
            .unwrap_or_else(|| "close checks did not pass".to_string());
        return Err(TransitionError::CheckFailed { message });
    }

    debug!(
        period = %period.period_label,
        actor,
        "soft-closing period"
    );

    let period = &mut periods[index];
    period.close_status = CloseStatus::SoftClosed;
    period.closed_at = Some(now);
    period.operated_by = Some(actor.to_string());

    evaluate(periods);
    Ok(())
}

/// `SoftClosed` -> `HardClosed`. Terminal: nothing reopens a hard-closed
/// period. Flips the successor's soft-close eligibility.
pub fn hard_close(
    periods: &mut [PeriodCloseStatus],
    period_id: &Uuid,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    let index = find_period(periods, period_id)?;
    let period = &periods[index];

    if period.close_status != CloseStatus::SoftClosed {
        return Err(TransitionError::NotSoftClosed {
            status: period.close_status,
        });
    }

    debug!(
        period = %period.period_label,
        actor,
        "hard-closing period"
    );

    let period = &mut periods[index];
    period.close_status = CloseStatus::HardClosed;
    period.closed_at = Some(now);
    period.operated_by = Some(actor.to_string());

    evaluate(periods);
    Ok(())
}

/// `SoftClosed` -> `Open`. Clears the audit fields and drops the successor's
/// soft-close eligibility back to a failing check.
pub fn reopen(
    periods: &mut [PeriodCloseStatus],
    period_id: &Uuid,
) -> Result<(), TransitionError> {
    let index = find_period(periods, period_id)?;
    let period = &periods[index];

    if period.close_status != CloseStatus::SoftClosed {
        return Err(TransitionError::NotSoftClosed {
            status: period.close_status,
        });
    }

    debug!(period = %period.period_label, "reopening period");

    let period = &mut periods[index];
    period.close_status = CloseStatus::Open;
    period.closed_at = None;
    period.operated_by = None;

    evaluate(periods);
    Ok(())
}

fn find_period(
    periods: &[PeriodCloseStatus],
    period_id: &Uuid,
) -> Result<usize, TransitionError> {
    periods
        .iter()
        .position(|period| period.accounting_period_id == *period_id)
        .ok_or(TransitionError::PeriodNotFound {
            period_id: *period_id,
        })
}
