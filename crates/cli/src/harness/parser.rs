use anyhow::{Context, Result};
use kessan_core::model::CloseScenario;
use std::path::Path;

/// Parse a close scenario from a YAML file, with field-level error paths.
pub fn parse_scenario(path: &Path) -> Result<CloseScenario> {
    if !path.exists() {
        anyhow::bail!("scenario file not found: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;

    let deserializer = serde_yaml::Deserializer::from_str(&content);
    let scenario: CloseScenario = serde_path_to_error::deserialize(deserializer)
        .with_context(|| format!("failed to parse YAML from: {}", path.display()))?;

    scenario
        .validate()
        .with_context(|| format!("validation failed for scenario: {}", path.display()))?;

    Ok(scenario)
}
