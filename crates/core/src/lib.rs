pub mod close;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;

pub use close::eligibility::evaluate;
pub use close::service::ClosingService;
pub use close::transition::TransitionError;
pub use engine::error::AllocationError;
pub use engine::io_traits::{AllocationWriteError, AllocationWriter, LedgerLoader};
pub use error::{CoreError, Result};
pub use model::{PeriodStore, PeriodStoreError};
pub use store::memory::InMemoryPeriodStore;
