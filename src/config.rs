use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AutosemverError, Result};

/// Represents the complete configuration for autosemver.
///
/// Carries the project identity used for packaging overrides and the
/// defaults applied when rendering changelogs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,
}

/// Project identity settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ProjectConfig {
    /// Project name, used for the `<NAME>_VERSION` environment override
    #[serde(default)]
    pub name: Option<String>,

    /// Base URL prepended to extracted bug references
    #[serde(default)]
    pub bugtracker_url: String,
}

/// Changelog rendering settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ChangelogConfig {
    /// Use the author-and-date header layout by default
    #[serde(default)]
    pub rpm_format: bool,
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `autosemver.toml` in current directory
/// 3. `autosemver.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./autosemver.toml").exists() {
        fs::read_to_string("./autosemver.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("autosemver.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| AutosemverError::config(e.to_string()))
}
