//! Structural validation of close scenario definitions.

use kessan_core::model::{
    CloseScenario, CloseStatus, ExpectedError, ScenarioExpectation, ScenarioPeriod, ScenarioStep,
    StepAction,
};

fn scenario(periods: Vec<ScenarioPeriod>, steps: Vec<ScenarioStep>) -> CloseScenario {
    CloseScenario {
        name: "scenario".to_string(),
        description: None,
        company_id: "acme".to_string(),
        fiscal_year: 2026,
        periods,
        ledger: vec![],
        rules: vec![],
        steps,
        expected: ScenarioExpectation::default(),
    }
}

fn period(period_no: i32) -> ScenarioPeriod {
    ScenarioPeriod {
        period_no,
        status: CloseStatus::Open,
    }
}

fn step(action: StepAction, period_no: i32) -> ScenarioStep {
    ScenarioStep {
        action,
        period_no,
        actor: None,
        dry_run: false,
        expect_error: None,
    }
}

#[test]
fn valid_scenario_passes() {
    let scenario = scenario(
        vec![period(1), period(2)],
        vec![step(StepAction::SoftClose, 1)],
    );
    scenario.validate().unwrap();
}

#[test]
fn empty_periods_are_rejected() {
    let scenario = scenario(vec![], vec![]);
    let error = scenario.validate().unwrap_err().to_string();
    assert!(error.contains("at least one period"));
}

#[test]
fn out_of_range_period_no_is_rejected() {
    let scenario = scenario(vec![period(13)], vec![]);
    let error = scenario.validate().unwrap_err().to_string();
    assert!(error.contains("out of range"));
}

#[test]
fn duplicate_period_no_is_rejected() {
    let scenario = scenario(vec![period(1), period(1)], vec![]);
    let error = scenario.validate().unwrap_err().to_string();
    assert!(error.contains("duplicate period_no"));
}

#[test]
fn step_on_undefined_period_is_rejected() {
    let scenario = scenario(vec![period(1)], vec![step(StepAction::SoftClose, 2)]);
    let error = scenario.validate().unwrap_err().to_string();
    assert!(error.contains("not defined"));
}

#[test]
fn step_on_undefined_period_is_allowed_when_not_found_is_expected() {
    let mut missing = step(StepAction::SoftClose, 2);
    missing.expect_error = Some(ExpectedError::PeriodNotFound);
    let scenario = scenario(vec![period(1)], vec![missing]);
    scenario.validate().unwrap();
}

#[test]
fn allocate_step_without_rules_is_rejected() {
    let scenario = scenario(vec![period(1)], vec![step(StepAction::Allocate, 1)]);
    let error = scenario.validate().unwrap_err().to_string();
    assert!(error.contains("allocation rule"));
}
