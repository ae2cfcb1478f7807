pub mod allocation;
pub mod check;
pub mod period;
pub mod period_store;
pub mod scenario;

pub use allocation::{
    AllocationReport, AllocationRule, AllocationRuleResult, AllocationTarget, DriverType,
};
pub use check::{CheckResult, CheckType};
pub use period::{CloseStatus, PeriodCloseStatus};
pub use period_store::{PeriodStore, PeriodStoreError};
pub use scenario::{
    CloseScenario, ExpectedAllocation, ExpectedError, ExpectedPeriod, LedgerLine,
    ScenarioExpectation, ScenarioPeriod, ScenarioStep, StepAction,
};
