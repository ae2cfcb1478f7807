//! Closing service
//!
//! Orchestrates load -> transition -> evaluate -> save as one unit per call.
//! Transitions on the same (company, fiscal year) scope are serialized
//! through a per-scope lock, since a transition recomputes its neighbour's
//! eligibility and both records must be persisted together.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::close::transition::{self, TransitionError};
use crate::close::eligibility::evaluate;
use crate::engine::allocation::execute_allocation;
use crate::engine::error::AllocationError;
use crate::engine::io_traits::{AllocationWriter, LedgerLoader};
use crate::model::{
    AllocationReport, AllocationRule, CloseStatus, PeriodCloseStatus, PeriodStore,
    PeriodStoreError,
};

pub const PERIODS_PER_YEAR: i32 = 12;

type ScopeKey = (String, i32);

pub struct ClosingService<S: PeriodStore> {
    store: S,
    scope_locks: Mutex<HashMap<ScopeKey, Arc<Mutex<()>>>>,
}

impl<S: PeriodStore> ClosingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            scope_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The fiscal year's periods with freshly evaluated eligibility. A year
    /// queried for the first time is seeded with twelve open periods.
    pub fn list_periods(
        &self,
        company_id: &str,
        fiscal_year: i32,
    ) -> Result<Vec<PeriodCloseStatus>, PeriodStoreError> {
        let scope = self.lock_scope(company_id, fiscal_year);
        let _guard = scope.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut periods = self.store.list_periods(company_id, fiscal_year)?;
        if periods.is_empty() {
            debug!(company_id, fiscal_year, "seeding fiscal year");
            periods = (1..=PERIODS_PER_YEAR)
                .map(|period_no| PeriodCloseStatus::open(company_id, fiscal_year, period_no))
                .collect();
            evaluate(&mut periods);
            self.store.save_periods(&periods)?;
        } else {
            evaluate(&mut periods);
        }

        Ok(periods)
    }

    /// Soft-close a period and persist the re-evaluated year.
    pub fn soft_close(
        &self,
        company_id: &str,
        fiscal_year: i32,
        period_id: &Uuid,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<PeriodCloseStatus>, TransitionError> {
        self.apply(company_id, fiscal_year, |periods| {
            transition::soft_close(periods, period_id, actor, now)
        })
    }

    /// Hard-close a period and persist the re-evaluated year.
    pub fn hard_close(
        &self,
        company_id: &str,
        fiscal_year: i32,
        period_id: &Uuid,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<PeriodCloseStatus>, TransitionError> {
        self.apply(company_id, fiscal_year, |periods| {
            transition::hard_close(periods, period_id, actor, now)
        })
    }

    /// Reopen a soft-closed period and persist the re-evaluated year.
    pub fn reopen(
        &self,
        company_id: &str,
        fiscal_year: i32,
        period_id: &Uuid,
    ) -> Result<Vec<PeriodCloseStatus>, TransitionError> {
        self.apply(company_id, fiscal_year, |periods| {
            transition::reopen(periods, period_id)
        })
    }

    /// Execute the allocation batch for a soft-closed period. Does not change
    /// close status. With `dry_run` the report is computed but nothing is
    /// written; otherwise the combined lines frame is written exactly once,
    /// after all rules have been computed.
    #[allow(clippy::too_many_arguments)]
    pub fn run_allocation(
        &self,
        company_id: &str,
        fiscal_year: i32,
        period_id: &Uuid,
        rules: &[AllocationRule],
        ledger: &dyn LedgerLoader,
        writer: &dyn AllocationWriter,
        dry_run: bool,
    ) -> Result<AllocationReport, AllocationError> {
        let periods = self.store.list_periods(company_id, fiscal_year)?;
        let period = periods
            .iter()
            .find(|period| period.accounting_period_id == *period_id)
            .ok_or(AllocationError::PeriodNotFound {
                period_id: *period_id,
            })?;

        if period.close_status != CloseStatus::SoftClosed {
            return Err(AllocationError::PreconditionFailed {
                status: period.close_status,
            });
        }

        let frame = ledger
            .load(company_id, period_id)
            .map_err(|error| AllocationError::LedgerLoad {
                message: error.to_string(),
            })?;

        let batch = execute_allocation(frame, rules)?;

        if !dry_run {
            writer.write(&batch.lines, period_id)?;
        }

        Ok(AllocationReport {
            accounting_period_id: *period_id,
            dry_run,
            results: batch.results,
        })
    }

    fn apply<F>(
        &self,
        company_id: &str,
        fiscal_year: i32,
        transition: F,
    ) -> Result<Vec<PeriodCloseStatus>, TransitionError>
    where
        F: FnOnce(&mut [PeriodCloseStatus]) -> Result<(), TransitionError>,
    {
        let scope = self.lock_scope(company_id, fiscal_year);
        let _guard = scope.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut periods = self.store.list_periods(company_id, fiscal_year)?;
        transition(&mut periods)?;
        self.store.save_periods(&periods)?;
        Ok(periods)
    }

    fn lock_scope(&self, company_id: &str, fiscal_year: i32) -> Arc<Mutex<()>> {
        let mut locks = self
            .scope_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry((company_id.to_string(), fiscal_year))
            .or_default()
            .clone()
    }
}
