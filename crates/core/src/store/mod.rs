pub mod memory;

pub use memory::{CollectingAllocationWriter, InMemoryLedger, InMemoryPeriodStore};
