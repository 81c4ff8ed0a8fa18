//! Configuration file resolution with global fallback.
//!
//! Priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/gw-conform.toml` or `{project}/.gw-conform.toml`
//! 3. `$GW_CONFORM_CONFIG_DIR/config.toml`, else `~/.gw-conform/config.toml`
//! 4. built-in defaults

use anyhow::{Context, Result};
use gw_conform_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: [&str; 2] = ["gw-conform.toml", ".gw-conform.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
const CONFIG_DIR_ENV: &str = "GW_CONFORM_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found; built-in defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the config file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves config files for a project.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    global_dir: Option<PathBuf>,
}

impl ConfigResolver {
    /// Uses `$GW_CONFORM_CONFIG_DIR`, falling back to `~/.gw-conform/`.
    #[must_use]
    pub fn from_env() -> Self {
        let global_dir = std::env::var_os(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| home::home_dir().map(|h| h.join(".gw-conform")));
        Self { global_dir }
    }

    /// Uses `dir` as the global config directory.
    #[must_use]
    pub fn with_global_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: Some(dir.into()),
        }
    }

    /// Picks the config source for `project_dir`.
    #[must_use]
    pub fn resolve(&self, project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }

        let project = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = project {
            tracing::debug!("Found project config: {}", path.display());
            return ConfigSource::Project(path);
        }

        let global = self
            .global_dir
            .as_ref()
            .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
            .filter(|candidate| candidate.is_file());
        if let Some(path) = global {
            tracing::debug!("Found global config: {}", path.display());
            return ConfigSource::Global(path);
        }

        ConfigSource::Default
    }
}
