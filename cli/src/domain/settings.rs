//! Bootstrap settings schema and validation.
//!
//! Pure types only: loading from YAML lives in `crate::infra::settings`,
//! flag overrides in `crate::cli`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::SettingsError;
use crate::domain::platform::ARCH_PLACEHOLDER;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BACKUP_FILE: &str = "nezha_config.json";
pub const DEFAULT_AGENT_BINARY: &str = "nezha-agent";
pub const DEFAULT_AGENT_CONFIG: &str = "nezha.yml";
pub const DEFAULT_AGENT_ARCHIVE: &str = "nezha.zip";
pub const DEFAULT_AGENT_URL: &str =
    "https://github.com/nezhahq/agent/releases/latest/download/nezha-agent_linux_{arch}.zip";
pub const DEFAULT_WORKLOAD_SCRIPT: &str = "argosbx.sh";
pub const DEFAULT_WORKLOAD_URL: &str =
    "https://raw.githubusercontent.com/yonggekkk/argosbx/main/argosbx.sh";
pub const DEFAULT_WORKLOAD_INTERPRETER: &str = "bash";

// ── Schema ───────────────────────────────────────────────────────────────────

/// Top-level settings, optionally loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Instruction used when no console input is given.
    pub preset: String,
    /// Seconds to wait for console input.
    pub prompt_timeout_secs: u64,
    /// Backup record of the last console instruction.
    pub backup_file: PathBuf,
    /// Register an `@reboot` crontab entry for the bootstrap.
    pub autostart: bool,
    /// Extra environment for the workload.
    pub env: BTreeMap<String, String>,
    /// Optional `env.sh`-style file with workload environment.
    pub env_file: Option<PathBuf>,
    pub agent: AgentSettings,
    pub workload: WorkloadSettings,
}

/// Agent binary, configuration file and download source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub binary: PathBuf,
    pub config_file: PathBuf,
    pub archive: PathBuf,
    /// Release URL; `{arch}` is replaced by `amd64` or `arm64`.
    pub download_url: String,
    /// Override for the detected architecture.
    pub arch: Option<String>,
}

/// Workload script, download source and launch command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadSettings {
    pub script: PathBuf,
    pub download_url: String,
    pub interpreter: String,
    pub args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: String::new(),
            prompt_timeout_secs: DEFAULT_PROMPT_TIMEOUT_SECS,
            backup_file: PathBuf::from(DEFAULT_BACKUP_FILE),
            autostart: true,
            env: BTreeMap::new(),
            env_file: None,
            agent: AgentSettings::default(),
            workload: WorkloadSettings::default(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_AGENT_BINARY),
            config_file: PathBuf::from(DEFAULT_AGENT_CONFIG),
            archive: PathBuf::from(DEFAULT_AGENT_ARCHIVE),
            download_url: DEFAULT_AGENT_URL.to_string(),
            arch: None,
        }
    }
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            script: PathBuf::from(DEFAULT_WORKLOAD_SCRIPT),
            download_url: DEFAULT_WORKLOAD_URL.to_string(),
            interpreter: DEFAULT_WORKLOAD_INTERPRETER.to_string(),
            args: Vec::new(),
        }
    }
}

impl Settings {
    /// Validate values that serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.prompt_timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout(self.prompt_timeout_secs).into());
        }
        if !self.agent.download_url.contains(ARCH_PLACEHOLDER) {
            return Err(
                SettingsError::MissingArchPlaceholder(self.agent.download_url.clone()).into(),
            );
        }
        for (field, path) in [
            ("agent.binary", &self.agent.binary),
            ("agent.config_file", &self.agent.config_file),
            ("agent.archive", &self.agent.archive),
            ("workload.script", &self.workload.script),
            ("backup_file", &self.backup_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(SettingsError::EmptyField { field }.into());
            }
        }
        if self.workload.interpreter.trim().is_empty() {
            return Err(SettingsError::EmptyField {
                field: "workload.interpreter",
            }
            .into());
        }
        Ok(())
    }

    /// Prompt timeout as a `Duration`.
    #[must_use]
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Resolve every file path against `workdir`.
    #[must_use]
    pub fn layout(&self, workdir: &Path) -> Layout {
        let at = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                workdir.join(p)
            }
        };
        Layout {
            workdir: workdir.to_path_buf(),
            agent_binary: at(&self.agent.binary),
            agent_config: at(&self.agent.config_file),
            agent_archive: at(&self.agent.archive),
            backup_file: at(&self.backup_file),
            workload_script: at(&self.workload.script),
        }
    }
}

/// Absolute file locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub workdir: PathBuf,
    pub agent_binary: PathBuf,
    pub agent_config: PathBuf,
    pub agent_archive: PathBuf,
    pub backup_file: PathBuf,
    pub workload_script: PathBuf,
}
