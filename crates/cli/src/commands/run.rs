use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::harness::{
    discover_scenarios, execute_scenario, execute_suite, parse_scenario, report_result,
    report_result_json, report_suite_result, report_suite_result_json, ErrorType, OutputFormat,
    RunResult, RunStatus, SuiteResult,
};

const DEFAULT_SUITE_DIR: &str = "tests/scenarios";

enum ExecutionTarget<'a> {
    Suite(&'a Path),
    Single(&'a Path),
}

/// Execute close scenarios
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Path to a close scenario YAML file (single scenario mode)
    #[arg(value_name = "SCENARIO")]
    pub scenario_path: Option<PathBuf>,

    /// Execute all scenarios in a directory (suite mode)
    #[arg(long, value_name = "DIR")]
    pub suite: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (human, json)
    #[arg(long, value_name = "FORMAT", default_value = "human")]
    pub output: String,
}

impl RunCommand {
    pub fn execute(&self) -> Result<i32> {
        match self.execution_target() {
            ExecutionTarget::Suite(suite_path) => self.execute_suite(suite_path),
            ExecutionTarget::Single(scenario_path) => self.execute_single(scenario_path),
        }
    }

    fn execution_target(&self) -> ExecutionTarget<'_> {
        if let Some(suite_path) = &self.suite {
            ExecutionTarget::Suite(suite_path)
        } else if let Some(scenario_path) = &self.scenario_path {
            ExecutionTarget::Single(scenario_path)
        } else {
            ExecutionTarget::Suite(Path::new(DEFAULT_SUITE_DIR))
        }
    }

    fn execute_single(&self, scenario_path: &Path) -> Result<i32> {
        let output_format = self.output_format()?;

        let scenario = match parse_scenario(scenario_path) {
            Ok(scenario) => scenario,
            Err(error) => {
                let result = RunResult::error(
                    scenario_path.display().to_string(),
                    ErrorType::ParseError,
                    error,
                );
                self.report_single(&result, output_format)?;
                return Ok(2);
            }
        };

        let result = match execute_scenario(&scenario) {
            Ok(result) => result,
            Err(error) => {
                let result =
                    RunResult::error(scenario.name.clone(), ErrorType::ExecutionError, error);
                self.report_single(&result, output_format)?;
                return Ok(2);
            }
        };

        self.report_single(&result, output_format)?;

        Ok(match result.status {
            RunStatus::Pass => 0,
            RunStatus::Fail => 1,
            RunStatus::Error => 2,
        })
    }

    fn execute_suite(&self, suite_path: &Path) -> Result<i32> {
        let output_format = self.output_format()?;

        let scenarios = discover_scenarios(suite_path)?;
        if scenarios.is_empty() {
            eprintln!("No close scenarios found in: {}", suite_path.display());
            return Ok(2);
        }

        if output_format == OutputFormat::Human {
            println!(
                "Discovered {} scenarios in: {}",
                scenarios.len(),
                suite_path.display()
            );
            println!();
        }

        let suite_result = execute_suite(&scenarios)?;
        self.report_suite(&suite_result, output_format)?;

        Ok(if suite_result.errors > 0 {
            2
        } else if suite_result.failed > 0 {
            1
        } else {
            0
        })
    }

    fn output_format(&self) -> Result<OutputFormat> {
        match self.output.to_ascii_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unsupported output format: {other}. Use human or json."),
        }
    }

    fn report_single(&self, result: &RunResult, output_format: OutputFormat) -> Result<()> {
        match output_format {
            OutputFormat::Human => report_result(result, self.verbose),
            OutputFormat::Json => report_result_json(result)?,
        }
        Ok(())
    }

    fn report_suite(&self, suite_result: &SuiteResult, output_format: OutputFormat) -> Result<()> {
        match output_format {
            OutputFormat::Human => report_suite_result(suite_result),
            OutputFormat::Json => report_suite_result_json(suite_result)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn command(scenario_path: Option<PathBuf>, suite: Option<PathBuf>) -> RunCommand {
        RunCommand {
            scenario_path,
            suite,
            verbose: false,
            output: "human".to_string(),
        }
    }

    #[test]
    fn execution_target_defaults_to_suite_directory() {
        let command = command(None, None);
        match command.execution_target() {
            ExecutionTarget::Suite(path) => assert_eq!(path, Path::new(DEFAULT_SUITE_DIR)),
            ExecutionTarget::Single(_) => panic!("expected suite target"),
        }
    }

    #[test]
    fn execution_target_prefers_explicit_scenario() {
        let scenario = PathBuf::from("scenario.yaml");
        let command = command(Some(scenario.clone()), None);
        match command.execution_target() {
            ExecutionTarget::Single(path) => assert_eq!(path, scenario.as_path()),
            ExecutionTarget::Suite(_) => panic!("expected single target"),
        }
    }

    #[test]
    fn missing_scenario_file_returns_exit_code_2() {
        let temp_dir = tempdir().unwrap();
        let command = command(Some(temp_dir.path().join("missing.yaml")), None);

        let exit_code = command.execute().unwrap();
        assert_eq!(exit_code, 2);
    }

    #[test]
    fn malformed_scenario_file_returns_exit_code_2() {
        let temp_dir = tempdir().unwrap();
        let scenario_path = temp_dir.path().join("invalid.yaml");
        fs::write(&scenario_path, "name: [\n").unwrap();

        let command = command(Some(scenario_path), None);
        let exit_code = command.execute().unwrap();
        assert_eq!(exit_code, 2);
    }

    #[test]
    fn passing_scenario_returns_exit_code_0() {
        let temp_dir = tempdir().unwrap();
        let scenario_path = temp_dir.path().join("sequential.yaml");
        let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..");
        let source_fixture = workspace_root.join("tests/scenarios/sequential-close.yaml");
        fs::copy(source_fixture, &scenario_path).unwrap();

        let command = command(Some(scenario_path), None);
        let exit_code = command.execute().unwrap();
        assert_eq!(exit_code, 0);
    }

    #[test]
    fn failing_scenario_returns_exit_code_1() {
        let temp_dir = tempdir().unwrap();
        let scenario_path = temp_dir.path().join("failing.yaml");
        fs::write(
            &scenario_path,
            r#"
name: failing
company_id: acme
fiscal_year: 2026
periods:
  - period_no: 1
steps: []
expected:
  periods:
    - period_no: 1
      status: hard_closed
"#,
        )
        .unwrap();

        let command = command(Some(scenario_path), None);
        let exit_code = command.execute().unwrap();
        assert_eq!(exit_code, 1);
    }

    #[test]
    fn suite_mode_aggregates_results() {
        let temp_dir = tempdir().unwrap();
        let suite_dir = temp_dir.path().join("suite");
        fs::create_dir_all(&suite_dir).unwrap();

        let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..");
        for fixture in ["sequential-close.yaml", "blocked-soft-close.yaml"] {
            fs::copy(
                workspace_root.join("tests/scenarios").join(fixture),
                suite_dir.join(fixture),
            )
            .unwrap();
        }

        let command = command(None, Some(suite_dir));
        let exit_code = command.execute().unwrap();
        assert_eq!(exit_code, 0);
    }

    #[test]
    fn json_output_is_accepted() {
        let temp_dir = tempdir().unwrap();
        let scenario_path = temp_dir.path().join("sequential.yaml");
        let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..");
        fs::copy(
            workspace_root.join("tests/scenarios/sequential-close.yaml"),
            &scenario_path,
        )
        .unwrap();

        let mut command = command(Some(scenario_path), None);
        command.output = "json".to_string();
        let exit_code = command.execute().unwrap();
        assert_eq!(exit_code, 0);
    }

    #[test]
    fn unsupported_output_format_is_rejected() {
        let command = RunCommand {
            scenario_path: None,
            suite: None,
            verbose: false,
            output: "junit".to_string(),
        };
        assert!(command.execute().is_err());
    }
}
