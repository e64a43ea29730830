//! Application service: telemetry agent provisioning and launch.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{
    LaunchSpec, LocalFs, ObservedChild, ProgressReporter, SupervisorHost,
};
use crate::application::services::log_exit;
use crate::domain::{
    AgentArch, AgentConfig, Layout, ReconciledConfig, Reconciliation, SupervisorError,
    WorkloadEnv, reconcile,
};

/// Inputs for [`ensure_and_launch`] that do not come from the host.
pub struct AgentOptions<'a> {
    pub layout: &'a Layout,
    /// Release URL template containing `{arch}`.
    pub download_url: &'a str,
    /// Explicit architecture from the settings file.
    pub arch_override: Option<&'a str>,
    /// `std::env::consts::ARCH` of the running host.
    pub host_arch: &'a str,
}

/// Outcome of the agent supervisor.
#[derive(Debug)]
pub enum AgentOutcome {
    /// No actionable configuration; nothing was touched.
    Skipped,
    /// The agent was started.
    Launched {
        reconciliation: Reconciliation,
        uuid: Option<String>,
        /// Whether the binary had to be downloaded first.
        fetched: bool,
        child: ObservedChild,
    },
}

/// Ensure the agent binary exists, write its reconciled configuration and
/// start it.
///
/// # Errors
///
/// Returns an error if the binary cannot be fetched, the configuration
/// cannot be written, or the process cannot be spawned. Nothing is launched
/// in that case.
pub async fn ensure_and_launch(
    host: &impl SupervisorHost,
    reporter: &impl ProgressReporter,
    config: Option<&AgentConfig>,
    opts: &AgentOptions<'_>,
) -> Result<AgentOutcome> {
    let Some(config) = config.filter(|c| c.is_actionable()) else {
        return Ok(AgentOutcome::Skipped);
    };
    let layout = opts.layout;

    let fetched = if host.exists(&layout.agent_binary) {
        false
    } else {
        fetch_binary(host, reporter, opts).await?;
        true
    };

    let reconciled = plan_config(host, config, &layout.agent_config);
    report_reconciliation(reporter, &reconciled);
    host.write(&layout.agent_config, &reconciled.text)
        .with_context(|| format!("writing {}", layout.agent_config.display()))?;

    let spec = LaunchSpec {
        name: "agent",
        program: layout.agent_binary.clone(),
        args: vec!["-c".to_string(), layout.agent_config.display().to_string()],
        workdir: layout.workdir.clone(),
        env: WorkloadEnv::new(),
    };
    let handle = host.launch(&spec).context("starting agent")?;
    reporter.success(&format!("agent started (connecting to {})", config.server));
    let child = handle.on_exit(log_exit);

    Ok(AgentOutcome::Launched {
        reconciliation: reconciled.outcome,
        uuid: reconciled.uuid,
        fetched,
        child,
    })
}

/// Reconcile `config` against the agent configuration file at `path`.
///
/// An unreadable file is treated like a missing one.
pub fn plan_config(fs: &impl LocalFs, config: &AgentConfig, path: &Path) -> ReconciledConfig {
    let persisted = if fs.exists(path) {
        fs.read_to_string(path).ok()
    } else {
        None
    };
    reconcile(config, persisted.as_deref())
}

/// Architecture to download for, honouring an explicit override.
///
/// # Errors
///
/// Returns [`crate::domain::PlatformError::Unsupported`] if neither the
/// override nor the host architecture maps to a release asset.
pub fn resolve_arch(arch_override: Option<&str>, host_arch: &str) -> Result<AgentArch> {
    let arch = match arch_override {
        Some(name) => name.parse::<AgentArch>()?,
        None => AgentArch::from_target(host_arch)?,
    };
    Ok(arch)
}

async fn fetch_binary(
    host: &impl SupervisorHost,
    reporter: &impl ProgressReporter,
    opts: &AgentOptions<'_>,
) -> Result<()> {
    let layout = opts.layout;
    let arch = resolve_arch(opts.arch_override, opts.host_arch)?;
    let url = arch.download_url(opts.download_url);

    if host.exists(&layout.agent_archive) {
        host.remove_file(&layout.agent_archive)
            .with_context(|| format!("removing stale {}", layout.agent_archive.display()))?;
    }

    reporter.step(&format!("downloading agent ({arch})..."));
    host.download(&url, &layout.agent_archive)
        .await
        .map_err(|e| SupervisorError::FetchFailed {
            what: "agent",
            url: url.clone(),
            reason: format!("{e:#}"),
        })?;

    reporter.step("extracting agent...");
    host.extract_zip(&layout.agent_archive, &layout.workdir)
        .await
        .with_context(|| format!("extracting {}", layout.agent_archive.display()))?;
    if let Err(e) = host.remove_file(&layout.agent_archive) {
        tracing::debug!(error = %e, "could not remove agent archive");
    }

    if !host.exists(&layout.agent_binary) {
        return Err(SupervisorError::BinaryMissingAfterExtract {
            archive: layout.agent_archive.display().to_string(),
            binary: layout.agent_binary.display().to_string(),
        }
        .into());
    }
    host.set_executable(&layout.agent_binary)
        .with_context(|| format!("chmod {}", layout.agent_binary.display()))?;
    reporter.success("agent downloaded");
    Ok(())
}

fn report_reconciliation(reporter: &impl ProgressReporter, reconciled: &ReconciledConfig) {
    match (reconciled.outcome, reconciled.uuid.as_deref()) {
        (Reconciliation::Forced, Some(uuid)) => {
            reporter.step(&format!("using forced agent identity {uuid}"));
        }
        (Reconciliation::Stable, Some(uuid)) => {
            reporter.step(&format!("connection unchanged, keeping identity {uuid}"));
        }
        _ => reporter.step("new connection parameters, agent will register a fresh identity"),
    }
}
