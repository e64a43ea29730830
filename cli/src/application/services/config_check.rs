//! Application service: dry-run inspection for `bootwarden check`.
//!
//! Resolves the configuration the next run would use (without prompting)
//! and previews the reconciliation. Writes nothing.

use crate::application::ports::{BackupStore, LocalFs};
use crate::application::services::agent_supervisor::{plan_config, resolve_arch};
use crate::domain::{
    AgentArch, AgentConfig, Candidates, ConfigSource, Layout, Reconciliation, Settings,
    parse_instruction,
};

/// Everything `check` reports.
#[derive(Debug)]
pub struct CheckReport {
    pub source: ConfigSource,
    /// Server of the winning configuration.
    pub server: Option<String>,
    /// Reconciliation against the current agent configuration file.
    pub reconciliation: Option<Reconciliation>,
    pub uuid: Option<String>,
    pub agent_binary_present: bool,
    pub workload_script_present: bool,
    /// Release architecture, or why none applies.
    pub arch: Result<AgentArch, String>,
    pub warnings: Vec<String>,
}

/// Inspect the preset, backup and on-disk state.
///
/// Infallible: unreadable inputs become warnings.
pub fn inspect(
    fs: &impl LocalFs,
    backup: &impl BackupStore,
    settings: &Settings,
    layout: &Layout,
    host_arch: &str,
) -> CheckReport {
    let mut warnings = Vec::new();

    let preset = parse_instruction(&settings.preset);
    if preset.is_none() && !settings.preset.trim().is_empty() {
        warnings.push("preset instruction lacks NZ_SERVER or NZ_CLIENT_SECRET".to_string());
    }
    let backup_config = match backup.load() {
        Ok(record) => record.map(AgentConfig::from),
        Err(e) => {
            warnings.push(format!("backup record unreadable: {e:#}"));
            None
        }
    };

    let resolved = Candidates {
        interactive: None,
        preset,
        backup: backup_config,
    }
    .resolve();

    let planned = resolved
        .config
        .as_ref()
        .map(|config| plan_config(fs, config, &layout.agent_config));

    CheckReport {
        source: resolved.source,
        server: resolved.config.map(|c| c.server),
        reconciliation: planned.as_ref().map(|p| p.outcome),
        uuid: planned.and_then(|p| p.uuid),
        agent_binary_present: fs.exists(&layout.agent_binary),
        workload_script_present: fs.exists(&layout.workload_script),
        arch: resolve_arch(settings.agent.arch.as_deref(), host_arch).map_err(|e| e.to_string()),
        warnings,
    }
}
