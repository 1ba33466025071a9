//! Configuration file loading and validation.

use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "boardkit.toml";

/// Loads and validates a `boardkit.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse(&content, &path.display().to_string())
}

/// Parses and validates a `boardkit.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    parse(content, CONFIG_FILE)
}

fn parse(content: &str, origin: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name"));
    }
    if config.project.top.is_empty() {
        return Err(ConfigError::MissingField("project.top"));
    }
    if config.board.name.is_empty() {
        return Err(ConfigError::MissingField("board.name"));
    }
    if config.build.name.is_empty() {
        return Err(ConfigError::MissingField("build.name"));
    }
    let mut seen = HashSet::new();
    for request in &config.requests {
        if !seen.insert((request.name.as_str(), request.index)) {
            return Err(ConfigError::DuplicateRequest {
                name: request.name.clone(),
                index: request.index,
            });
        }
    }
    Ok(())
}
