pub mod allocation;
pub mod error;
pub mod io_traits;

pub use allocation::{execute_allocation, AllocationBatch};
pub use error::AllocationError;
pub use io_traits::{AllocationWriteError, AllocationWriter, LedgerLoader};
