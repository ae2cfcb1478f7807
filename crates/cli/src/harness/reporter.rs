use anyhow::Result;

use crate::harness::executor::{RunResult, RunStatus, SuiteResult};

/// Output format for scenario results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Report a single scenario result in human-readable form.
pub fn report_result(result: &RunResult, verbose: bool) {
    println!("Scenario: {}", result.scenario_name);

    match result.status {
        RunStatus::Pass => {
            println!("Status: PASS");
        }
        RunStatus::Fail => {
            println!("Status: FAIL");
            println!();
            println!("Mismatches ({}):", result.mismatches.len());
            for (index, mismatch) in result.mismatches.iter().enumerate() {
                println!("  ✗ {}", mismatch.detail);
                if !verbose && index == 4 && result.mismatches.len() > 5 {
                    println!(
                        "  ... and {} more mismatches (use --verbose to see all)",
                        result.mismatches.len() - 5
                    );
                    break;
                }
            }
        }
        RunStatus::Error => {
            println!("Status: ERROR");
            if let Some(error) = &result.error {
                println!();
                println!("Error: {}", error.message);
            }
        }
    }
}

/// Report suite results in human-readable form.
pub fn report_suite_result(suite_result: &SuiteResult) {
    println!("Close Scenario Results");
    println!("======================");
    println!();
    println!("Total:  {}", suite_result.total);
    println!("Passed: {}", suite_result.passed);
    println!("Failed: {}", suite_result.failed);
    println!("Errors: {}", suite_result.errors);
    println!();

    for result in &suite_result.results {
        let status_symbol = match result.status {
            RunStatus::Pass => "✓",
            RunStatus::Fail => "✗",
            RunStatus::Error => "⚠",
        };
        println!("{} {}", status_symbol, result.scenario_name);
    }
}

pub fn report_result_json(result: &RunResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}

pub fn report_suite_result_json(suite_result: &SuiteResult) -> Result<()> {
    let json = serde_json::to_string_pretty(suite_result)?;
    println!("{}", json);
    Ok(())
}
