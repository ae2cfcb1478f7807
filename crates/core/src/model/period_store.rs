use thiserror::Error;
use uuid::Uuid;

use crate::model::PeriodCloseStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodStoreError {
    #[error("period '{period_id}' not found")]
    PeriodNotFound { period_id: Uuid },
    #[error("period store operation failed: {message}")]
    OperationFailed { message: String },
}

/// Persistence seam for period close records, scoped by company and fiscal
/// year. `save_periods` must apply the whole batch atomically: a transition
/// writes the mutated period and its re-evaluated neighbours as one unit, and
/// concurrent readers must never observe a partial write.
pub trait PeriodStore {
    fn get_period(
        &self,
        company_id: &str,
        fiscal_year: i32,
        period_no: i32,
    ) -> Result<Option<PeriodCloseStatus>, PeriodStoreError>;

    /// All periods of the fiscal year, ordered by `period_no`.
    fn list_periods(
        &self,
        company_id: &str,
        fiscal_year: i32,
    ) -> Result<Vec<PeriodCloseStatus>, PeriodStoreError>;

    fn save_periods(&self, periods: &[PeriodCloseStatus]) -> Result<(), PeriodStoreError>;
}
