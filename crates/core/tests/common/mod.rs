use kessan_core::model::{CloseStatus, PeriodCloseStatus};
use kessan_core::store::memory::InMemoryPeriodStore;
use kessan_core::ClosingService;

pub const COMPANY: &str = "acme";
pub const YEAR: i32 = 2026;

pub fn make_period(period_no: i32, status: CloseStatus) -> PeriodCloseStatus {
    let mut period = PeriodCloseStatus::open(COMPANY, YEAR, period_no);
    period.close_status = status;
    period
}

/// Service over a store seeded with the given statuses for periods 1..=n.
pub fn service_with_year(statuses: &[CloseStatus]) -> ClosingService<InMemoryPeriodStore> {
    let mut store = InMemoryPeriodStore::new();
    for (index, status) in statuses.iter().enumerate() {
        store = store.with_period(make_period(index as i32 + 1, *status));
    }
    ClosingService::new(store)
}

#[allow(dead_code)]
pub fn period_id_of(
    service: &ClosingService<InMemoryPeriodStore>,
    period_no: i32,
) -> uuid::Uuid {
    service
        .list_periods(COMPANY, YEAR)
        .unwrap()
        .into_iter()
        .find(|period| period.period_no == period_no)
        .map(|period| period.accounting_period_id)
        .expect("period exists")
}
