//! Allocation batch orchestration through the closing service: the
//! soft-closed precondition, dry-run semantics, and the single-write path.

mod common;

use common::{period_id_of, service_with_year, COMPANY, YEAR};
use kessan_core::model::CloseStatus::{Open, SoftClosed};
use kessan_core::model::{AllocationRule, AllocationTarget, DriverType};
use kessan_core::store::memory::{CollectingAllocationWriter, FailingLedger, InMemoryLedger};
use kessan_core::AllocationError;
use polars::prelude::df;
use uuid::Uuid;

fn ledger() -> InMemoryLedger {
    InMemoryLedger::new(
        df! {
            "account" => &["6200", "6200", "5100"],
            "department" => &["it", "it", "sales"],
            "amount" => &[600.0, 400.0, 50.0],
        }
        .unwrap(),
    )
}

fn rules() -> Vec<AllocationRule> {
    vec![AllocationRule {
        id: Uuid::now_v7(),
        name: "it-cost".to_string(),
        source_account: "6200".to_string(),
        source_department: None,
        driver: DriverType::Ratio,
        targets: vec![
            AllocationTarget {
                department: "sales".to_string(),
                ratio: 0.6,
            },
            AllocationTarget {
                department: "ops".to_string(),
                ratio: 0.4,
            },
        ],
    }]
}

#[test]
fn dry_run_reports_without_writing() {
    // Scenario E, dry-run half
    let service = service_with_year(&[SoftClosed, Open]);
    let p1 = period_id_of(&service, 1);
    let writer = CollectingAllocationWriter::new();

    let report = service
        .run_allocation(COMPANY, YEAR, &p1, &rules(), &ledger(), &writer, true)
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.accounting_period_id, p1);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].source_amount, 1000.0);
    assert_eq!(report.results[0].allocated_amount, 1000.0);
    assert_eq!(report.results[0].target_count, 2);
    assert_eq!(writer.write_count(), 0);
}

#[test]
fn open_period_is_rejected() {
    // Scenario E, precondition half
    let service = service_with_year(&[Open, Open]);
    let p1 = period_id_of(&service, 1);
    let writer = CollectingAllocationWriter::new();

    let error = service
        .run_allocation(COMPANY, YEAR, &p1, &rules(), &ledger(), &writer, true)
        .unwrap_err();

    assert!(matches!(
        error,
        AllocationError::PreconditionFailed { status: Open }
    ));
    assert_eq!(writer.write_count(), 0);
}

#[test]
fn non_dry_run_writes_combined_lines_once() {
    let service = service_with_year(&[SoftClosed]);
    let p1 = period_id_of(&service, 1);
    let writer = CollectingAllocationWriter::new();

    let report = service
        .run_allocation(COMPANY, YEAR, &p1, &rules(), &ledger(), &writer, false)
        .unwrap();

    assert!(!report.dry_run);
    assert_eq!(writer.write_count(), 1);

    let lines = &writer.written()[0];
    assert_eq!(lines.height(), 2);
    let amounts = lines.column("amount").unwrap().f64().unwrap();
    assert_eq!(amounts.get(0), Some(600.0));
    assert_eq!(amounts.get(1), Some(400.0));
}

#[test]
fn allocation_leaves_close_status_untouched() {
    let service = service_with_year(&[SoftClosed]);
    let p1 = period_id_of(&service, 1);
    let writer = CollectingAllocationWriter::new();

    service
        .run_allocation(COMPANY, YEAR, &p1, &rules(), &ledger(), &writer, false)
        .unwrap();

    let periods = service.list_periods(COMPANY, YEAR).unwrap();
    assert_eq!(periods[0].close_status, SoftClosed);
}

#[test]
fn ledger_failure_aborts_before_any_write() {
    let service = service_with_year(&[SoftClosed]);
    let p1 = period_id_of(&service, 1);
    let writer = CollectingAllocationWriter::new();

    let error = service
        .run_allocation(COMPANY, YEAR, &p1, &rules(), &FailingLedger, &writer, false)
        .unwrap_err();

    assert!(matches!(error, AllocationError::LedgerLoad { .. }));
    assert_eq!(writer.write_count(), 0);
}

#[test]
fn write_failure_is_surfaced() {
    let service = service_with_year(&[SoftClosed]);
    let p1 = period_id_of(&service, 1);
    let writer = CollectingAllocationWriter::new().with_failure("disk full");

    let error = service
        .run_allocation(COMPANY, YEAR, &p1, &rules(), &ledger(), &writer, false)
        .unwrap_err();

    assert!(matches!(error, AllocationError::Write(_)));
}

#[test]
fn unknown_period_is_rejected() {
    let service = service_with_year(&[SoftClosed]);
    let missing = Uuid::now_v7();
    let writer = CollectingAllocationWriter::new();

    let error = service
        .run_allocation(COMPANY, YEAR, &missing, &rules(), &ledger(), &writer, true)
        .unwrap_err();

    assert!(matches!(error, AllocationError::PeriodNotFound { .. }));
}
