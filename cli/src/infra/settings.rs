//! Loading of the YAML settings file and the workload env file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::env::parse_env_file;
use crate::domain::{Settings, WorkloadEnv};

/// Reads [`Settings`] from an optional YAML file.
pub struct YamlSettingsStore {
    path: Option<PathBuf>,
}

impl YamlSettingsStore {
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Load the settings. Without a path the built-in defaults apply; a
    /// path that was given explicitly must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Settings> {
        let Some(path) = &self.path else {
            return Ok(Settings::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }
}

/// Read an `env.sh`-style file of `export NAME="value"` lines.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed.
pub fn load_env_file(path: &Path) -> Result<WorkloadEnv> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_env_file(&content).with_context(|| format!("cannot parse {}", path.display()))
}
