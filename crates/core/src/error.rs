use thiserror::Error;

use crate::close::transition::TransitionError;
use crate::engine::error::AllocationError;
use crate::model::PeriodStoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Umbrella error for callers that drive both the close and allocation
/// surfaces through one channel.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Store(#[from] PeriodStoreError),
}
