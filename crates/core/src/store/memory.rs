//! In-memory store implementations, used by the scenario harness and tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use polars::prelude::{DataFrame, IntoLazy, LazyFrame};
use uuid::Uuid;

use crate::engine::io_traits::{AllocationWriteError, AllocationWriter, LedgerLoader};
use crate::model::{PeriodCloseStatus, PeriodStore, PeriodStoreError};

type PeriodKey = (String, i32, i32);

/// `PeriodStore` backed by a mutex-guarded map. `save_periods` replaces the
/// whole batch under one lock, so readers never observe a partial write.
#[derive(Default)]
pub struct InMemoryPeriodStore {
    periods: Mutex<BTreeMap<PeriodKey, PeriodCloseStatus>>,
    failure: Option<String>,
}

impl InMemoryPeriodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(self, period: PeriodCloseStatus) -> Self {
        {
            let mut periods = self.periods.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            periods.insert(key_of(&period), period);
        }
        self
    }

    /// Make every store operation fail, for error-path tests.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn check_failure(&self) -> Result<(), PeriodStoreError> {
        if let Some(message) = &self.failure {
            return Err(PeriodStoreError::OperationFailed {
                message: message.clone(),
            });
        }
        Ok(())
    }
}

fn key_of(period: &PeriodCloseStatus) -> PeriodKey {
    (
        period.company_id.clone(),
        period.fiscal_year,
        period.period_no,
    )
}

impl PeriodStore for InMemoryPeriodStore {
    fn get_period(
        &self,
        company_id: &str,
        fiscal_year: i32,
        period_no: i32,
    ) -> Result<Option<PeriodCloseStatus>, PeriodStoreError> {
        self.check_failure()?;
        let periods = self.periods.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(periods
            .get(&(company_id.to_string(), fiscal_year, period_no))
            .cloned())
    }

    fn list_periods(
        &self,
        company_id: &str,
        fiscal_year: i32,
    ) -> Result<Vec<PeriodCloseStatus>, PeriodStoreError> {
        self.check_failure()?;
        let periods = self.periods.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // BTreeMap iteration keeps periods ordered by period_no within scope.
        Ok(periods
            .range(
                (company_id.to_string(), fiscal_year, i32::MIN)
                    ..=(company_id.to_string(), fiscal_year, i32::MAX),
            )
            .map(|(_, period)| period.clone())
            .collect())
    }

    fn save_periods(&self, batch: &[PeriodCloseStatus]) -> Result<(), PeriodStoreError> {
        self.check_failure()?;
        let mut periods = self.periods.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for period in batch {
            periods.insert(key_of(period), period.clone());
        }
        Ok(())
    }
}

/// `LedgerLoader` serving one fixed frame regardless of period.
pub struct InMemoryLedger {
    frame: DataFrame,
}

impl InMemoryLedger {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl LedgerLoader for InMemoryLedger {
    fn load(&self, _company_id: &str, _accounting_period_id: &Uuid) -> Result<LazyFrame> {
        Ok(self.frame.clone().lazy())
    }
}

/// `AllocationWriter` that records written frames for inspection.
#[derive(Default)]
pub struct CollectingAllocationWriter {
    written: Mutex<Vec<DataFrame>>,
    failure: Option<String>,
}

impl CollectingAllocationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn written(&self) -> Vec<DataFrame> {
        self.written.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn write_count(&self) -> usize {
        self.written.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

impl AllocationWriter for CollectingAllocationWriter {
    fn write(
        &self,
        lines: &DataFrame,
        _accounting_period_id: &Uuid,
    ) -> Result<(), AllocationWriteError> {
        if let Some(message) = &self.failure {
            return Err(AllocationWriteError::WriteFailed {
                message: message.clone(),
            });
        }
        self.written.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(lines.clone());
        Ok(())
    }
}

/// Loader that always fails, for error-path tests.
pub struct FailingLedger;

impl LedgerLoader for FailingLedger {
    fn load(&self, _company_id: &str, _accounting_period_id: &Uuid) -> Result<LazyFrame> {
        Err(anyhow!("ledger backend unavailable"))
    }
}
