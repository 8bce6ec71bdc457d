//! Configuration handling
//!
//! Configuration is stored in `.babcheck.toml` (next to the root
//! babfile or any parent of the working directory) and
//! `~/.config/babcheck/config.toml` (global). Project settings
//! override global ones.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project config file name.
const PROJECT_CONFIG_NAME: &str = ".babcheck.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatPreference {
    #[default]
    Text,
    Json,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root babfile to use instead of directory discovery
    pub root: Option<PathBuf>,

    /// Output format override for this project
    pub default_format: Option<FormatPreference>,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: FormatPreference,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration from default locations, searching for the
    /// project file upward from the current directory.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = match find_project_config() {
            Some(path) => Self::load_project(&path)?,
            None => ProjectConfig::default(),
        };

        Ok(Self { project, global })
    }

    /// Loads configuration with the project file at a known root.
    pub fn for_root(root_dir: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let path = root_dir.join(PROJECT_CONFIG_NAME);
        let project = if path.is_file() {
            Self::load_project(&path)?
        } else {
            ProjectConfig::default()
        };

        Ok(Self { project, global })
    }

    /// Effective output format after project override.
    pub fn default_format(&self) -> FormatPreference {
        self.project.default_format.unwrap_or(self.global.default_format)
    }

    /// Root babfile override, if configured.
    pub fn root_override(&self) -> Option<&Path> {
        self.project.root.as_deref()
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("sh", "bab", "babcheck").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    fn load_project(path: &Path) -> Result<ProjectConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }
}

/// Finds the project config by walking up from the current directory.
fn find_project_config() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(PROJECT_CONFIG_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}
