use anyhow::{Context, Result};
use chrono::Utc;
use kessan_core::model::{
    AllocationRuleResult, CloseScenario, ExpectedError, PeriodCloseStatus, ScenarioStep,
    StepAction,
};
use kessan_core::store::memory::{CollectingAllocationWriter, InMemoryLedger, InMemoryPeriodStore};
use kessan_core::{AllocationError, ClosingService, TransitionError};
use polars::prelude::df;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::harness::comparator::{compare_allocations, compare_periods, Mismatch};
use crate::harness::parser::parse_scenario;

const DEFAULT_ACTOR: &str = "harness";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    ParseError,
    ExecutionError,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunErrorDetail {
    pub error_type: ErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub scenario_name: String,
    pub status: RunStatus,
    pub mismatches: Vec<Mismatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunErrorDetail>,
}

impl RunResult {
    pub fn error(scenario_name: String, error_type: ErrorType, error: anyhow::Error) -> Self {
        Self {
            scenario_name,
            status: RunStatus::Error,
            mismatches: vec![],
            error: Some(RunErrorDetail {
                error_type,
                message: format!("{error:#}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub results: Vec<RunResult>,
}

/// Replay one scenario against a fresh in-memory store.
pub fn execute_scenario(scenario: &CloseScenario) -> Result<RunResult> {
    let mut store = InMemoryPeriodStore::new();
    for seed in &scenario.periods {
        let mut period =
            PeriodCloseStatus::open(&scenario.company_id, scenario.fiscal_year, seed.period_no);
        period.close_status = seed.status;
        store = store.with_period(period);
    }
    let service = ClosingService::new(store);

    let ledger = build_ledger(scenario)?;
    let writer = CollectingAllocationWriter::new();

    let mut mismatches: Vec<Mismatch> = Vec::new();
    let mut allocation_results: Vec<AllocationRuleResult> = Vec::new();

    for (step_no, step) in scenario.steps.iter().enumerate() {
        let outcome = execute_step(scenario, &service, step, &ledger, &writer)?;
        match outcome {
            StepOutcome::Ok(results) => {
                if let Some(results) = results {
                    allocation_results = results;
                }
                if let Some(expected) = step.expect_error {
                    mismatches.push(Mismatch::step(
                        step_no,
                        format!("expected {expected:?} but the step succeeded"),
                    ));
                }
            }
            StepOutcome::Rejected(kind, message) => match step.expect_error {
                Some(expected) if expected == kind => {}
                Some(expected) => mismatches.push(Mismatch::step(
                    step_no,
                    format!("expected {expected:?} but got {kind:?}: {message}"),
                )),
                None => mismatches.push(Mismatch::step(
                    step_no,
                    format!("unexpected rejection {kind:?}: {message}"),
                )),
            },
        }
    }

    let final_periods = service
        .list_periods(&scenario.company_id, scenario.fiscal_year)
        .context("failed to load final period state")?;

    mismatches.extend(compare_periods(&final_periods, &scenario.expected.periods));
    mismatches.extend(compare_allocations(
        &allocation_results,
        &scenario.expected.allocations,
    ));

    let status = if mismatches.is_empty() {
        RunStatus::Pass
    } else {
        RunStatus::Fail
    };

    Ok(RunResult {
        scenario_name: scenario.name.clone(),
        status,
        mismatches,
        error: None,
    })
}

enum StepOutcome {
    Ok(Option<Vec<AllocationRuleResult>>),
    Rejected(ExpectedError, String),
}

fn execute_step(
    scenario: &CloseScenario,
    service: &ClosingService<InMemoryPeriodStore>,
    step: &ScenarioStep,
    ledger: &InMemoryLedger,
    writer: &CollectingAllocationWriter,
) -> Result<StepOutcome> {
    let period_id = resolve_period_id(scenario, service, step.period_no)?;
    let actor = step.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
    let now = Utc::now();
    let company = &scenario.company_id;
    let year = scenario.fiscal_year;

    match step.action {
        StepAction::SoftClose => {
            classify_transition(service.soft_close(company, year, &period_id, actor, now))
        }
        StepAction::HardClose => {
            classify_transition(service.hard_close(company, year, &period_id, actor, now))
        }
        StepAction::Reopen => classify_transition(service.reopen(company, year, &period_id)),
        StepAction::Allocate => {
            let result = service.run_allocation(
                company,
                year,
                &period_id,
                &scenario.rules,
                ledger,
                writer,
                step.dry_run,
            );
            match result {
                Ok(report) => Ok(StepOutcome::Ok(Some(report.results))),
                Err(error @ AllocationError::PreconditionFailed { .. }) => {
                    Ok(StepOutcome::Rejected(
                        ExpectedError::AllocationPreconditionFailed,
                        error.to_string(),
                    ))
                }
                Err(error @ AllocationError::PeriodNotFound { .. }) => Ok(StepOutcome::Rejected(
                    ExpectedError::PeriodNotFound,
                    error.to_string(),
                )),
                Err(error) => Err(error).context("allocation step failed"),
            }
        }
    }
}

fn classify_transition(
    result: std::result::Result<Vec<PeriodCloseStatus>, TransitionError>,
) -> Result<StepOutcome> {
    match result {
        Ok(_) => Ok(StepOutcome::Ok(None)),
        Err(error) => {
            let kind = match &error {
                TransitionError::PeriodNotFound { .. } => ExpectedError::PeriodNotFound,
                TransitionError::AlreadyClosed { .. } => ExpectedError::AlreadyClosed,
                TransitionError::NotSoftClosed { .. } => ExpectedError::NotSoftClosed,
                TransitionError::CheckFailed { .. } => ExpectedError::CheckFailed,
                TransitionError::Store(_) => {
                    return Err(error).context("transition step failed")
                }
            };
            Ok(StepOutcome::Rejected(kind, error.to_string()))
        }
    }
}

fn resolve_period_id(
    scenario: &CloseScenario,
    service: &ClosingService<InMemoryPeriodStore>,
    period_no: i32,
) -> Result<Uuid> {
    let periods = service
        .list_periods(&scenario.company_id, scenario.fiscal_year)
        .context("failed to load periods")?;
    Ok(periods
        .into_iter()
        .find(|period| period.period_no == period_no)
        .map(|period| period.accounting_period_id)
        // A deliberately unknown id, so steps aimed at undefined periods hit
        // the not-found rejection.
        .unwrap_or_else(Uuid::now_v7))
}

fn build_ledger(scenario: &CloseScenario) -> Result<InMemoryLedger> {
    let accounts: Vec<String> = scenario.ledger.iter().map(|l| l.account.clone()).collect();
    let departments: Vec<String> = scenario
        .ledger
        .iter()
        .map(|l| l.department.clone())
        .collect();
    let amounts: Vec<f64> = scenario.ledger.iter().map(|l| l.amount).collect();

    let frame = df! {
        "account" => accounts,
        "department" => departments,
        "amount" => amounts,
    }
    .context("failed to build ledger frame")?;

    Ok(InMemoryLedger::new(frame))
}

/// All scenario files under a suite directory, ordered by path.
pub fn discover_scenarios(suite_dir: &Path) -> Result<Vec<PathBuf>> {
    if !suite_dir.is_dir() {
        anyhow::bail!("suite directory not found: {}", suite_dir.display());
    }

    let mut scenarios: Vec<PathBuf> = WalkDir::new(suite_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    scenarios.sort();

    Ok(scenarios)
}

/// Parse and execute every scenario; parse and execution failures become
/// `Error` results rather than aborting the suite.
pub fn execute_suite(scenarios: &[PathBuf]) -> Result<SuiteResult> {
    let mut results = Vec::with_capacity(scenarios.len());

    for path in scenarios {
        let result = match parse_scenario(path) {
            Ok(scenario) => match execute_scenario(&scenario) {
                Ok(result) => result,
                Err(error) => RunResult::error(
                    scenario.name.clone(),
                    ErrorType::ExecutionError,
                    error,
                ),
            },
            Err(error) => RunResult::error(
                path.display().to_string(),
                ErrorType::ParseError,
                error,
            ),
        };
        results.push(result);
    }

    let passed = results.iter().filter(|r| r.status == RunStatus::Pass).count();
    let failed = results.iter().filter(|r| r.status == RunStatus::Fail).count();
    let errors = results.iter().filter(|r| r.status == RunStatus::Error).count();

    Ok(SuiteResult {
        total: results.len(),
        passed,
        failed,
        errors,
        results,
    })
}
