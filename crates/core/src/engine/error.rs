use thiserror::Error;
use uuid::Uuid;

use crate::engine::io_traits::AllocationWriteError;
use crate::model::{CloseStatus, PeriodStoreError};

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("period '{period_id}' not found")]
    PeriodNotFound { period_id: Uuid },
    #[error("allocation requires a soft-closed period (current status: {status})")]
    PreconditionFailed { status: CloseStatus },
    #[error("allocation rule '{rule}' failed: {message}")]
    RuleFailed { rule: String, message: String },
    #[error("failed to load ledger data: {message}")]
    LedgerLoad { message: String },
    #[error("allocation engine error: {message}")]
    Engine { message: String },
    #[error(transparent)]
    Write(#[from] AllocationWriteError),
    #[error(transparent)]
    Store(#[from] PeriodStoreError),
}
