use anyhow::Result;
use polars::prelude::{DataFrame, LazyFrame};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AllocationWriteError {
    #[error("failed to write allocation lines: {message}")]
    WriteFailed { message: String },
}

/// Supplies the ledger lines of one accounting period as a lazy frame with
/// `account`, `department`, and `amount` columns.
pub trait LedgerLoader {
    fn load(&self, company_id: &str, accounting_period_id: &Uuid) -> Result<LazyFrame>;
}

/// Persists the allocation lines produced by a non-dry-run batch. Invoked at
/// most once per batch, after every rule has been computed.
pub trait AllocationWriter {
    fn write(
        &self,
        lines: &DataFrame,
        accounting_period_id: &Uuid,
    ) -> std::result::Result<(), AllocationWriteError>;
}
