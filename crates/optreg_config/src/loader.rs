//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name searched for in a project directory.
pub const CONFIG_FILE_NAME: &str = "optreg.toml";

/// Loads and validates an `optreg.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = load_config_from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        project = %config.project.name,
        "loaded configuration"
    );
    Ok(config)
}

/// Parses and validates an `optreg.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.trim().is_empty() {
        return Err(ConfigError::Blank("project.name"));
    }
    if config.project.compilation.trim().is_empty() {
        return Err(ConfigError::Blank("project.compilation"));
    }
    if config.output.dir.trim().is_empty() {
        return Err(ConfigError::Blank("output.dir"));
    }
    if let Some(framework) = &config.target.framework {
        if framework.trim().is_empty() {
            return Err(ConfigError::Blank("target.framework"));
        }
    }
    if let Some(code) = config
        .diagnostics
        .deny
        .iter()
        .find(|c| config.diagnostics.allow.contains(c))
    {
        return Err(ConfigError::ConflictingPolicy(code.clone()));
    }
    Ok(())
}
