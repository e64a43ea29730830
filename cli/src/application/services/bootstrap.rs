//! Application service: the bootstrap sequence.
//!
//! `Init → ResolveConfig → LaunchAgent → LaunchWorkload → Idle`. Every phase
//! after `Init` runs regardless of how earlier phases went; failures are
//! reported and recorded in the [`BootReport`].

use std::fmt;

use anyhow::Result;

use crate::application::ports::{
    BackupStore, BootRegistration, BootScheduler, InputPrompt, ProgressReporter, PromptOutcome,
    SupervisorHost,
};
use crate::application::services::agent_supervisor::{self, AgentOptions, AgentOutcome};
use crate::application::services::workload_supervisor::{
    self, WorkloadOptions, WorkloadOutcome,
};
use crate::domain::{
    AgentConfig, BackupRecord, BootEntry, Candidates, ConfigSource, Layout, Settings, WorkloadEnv,
    parse_instruction,
};

const PROMPT: &str = "input > ";

/// Phases of a bootstrap run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    Init,
    ResolveConfig,
    LaunchAgent,
    LaunchWorkload,
    Idle,
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::ResolveConfig => "resolve-config",
            Self::LaunchAgent => "launch-agent",
            Self::LaunchWorkload => "launch-workload",
            Self::Idle => "idle",
        })
    }
}

pub struct BootOptions<'a> {
    pub settings: &'a Settings,
    pub layout: &'a Layout,
    /// `None` disables boot registration.
    pub boot_entry: Option<&'a BootEntry>,
    /// Skip the console prompt entirely.
    pub non_interactive: bool,
    pub workload_env: WorkloadEnv,
    pub host_arch: &'a str,
}

/// What happened during a run. Returned once the `Idle` phase is reached.
#[derive(Debug)]
pub struct BootReport {
    pub phases: Vec<BootPhase>,
    /// `None` when registration was disabled or failed.
    pub registration: Option<BootRegistration>,
    pub source: ConfigSource,
    pub agent: Result<AgentOutcome>,
    pub workload: Result<WorkloadOutcome>,
}

/// Run the bootstrap sequence up to the idle phase.
///
/// Never fails as a whole: each phase reports its own failure and the
/// sequence moves on.
pub async fn run(
    host: &impl SupervisorHost,
    backup: &impl BackupStore,
    scheduler: &impl BootScheduler,
    prompt: &impl InputPrompt,
    reporter: &impl ProgressReporter,
    opts: BootOptions<'_>,
) -> BootReport {
    let mut phases = vec![BootPhase::Init];
    let registration = match opts.boot_entry {
        Some(entry) => register(scheduler, reporter, entry).await,
        None => None,
    };

    phases.push(BootPhase::ResolveConfig);
    let candidates = gather_candidates(backup, prompt, reporter, &opts).await;
    let resolved = candidates.resolve();
    match resolved.source {
        ConfigSource::None => reporter.info("no agent configuration found, starting workload only"),
        source => reporter.step(&format!("using {source}")),
    }

    phases.push(BootPhase::LaunchAgent);
    let settings = opts.settings;
    let agent_opts = AgentOptions {
        layout: opts.layout,
        download_url: &settings.agent.download_url,
        arch_override: settings.agent.arch.as_deref(),
        host_arch: opts.host_arch,
    };
    let agent =
        agent_supervisor::ensure_and_launch(host, reporter, resolved.config.as_ref(), &agent_opts)
            .await;
    if let Err(e) = &agent {
        reporter.warn(&format!("agent not started: {e:#}"));
    }

    phases.push(BootPhase::LaunchWorkload);
    let workload_opts = WorkloadOptions {
        layout: opts.layout,
        download_url: &settings.workload.download_url,
        interpreter: &settings.workload.interpreter,
        args: &settings.workload.args,
    };
    let workload =
        workload_supervisor::ensure_and_launch(host, reporter, opts.workload_env, &workload_opts)
            .await;
    if let Err(e) = &workload {
        reporter.warn(&format!("workload not started: {e:#}"));
    }

    phases.push(BootPhase::Idle);
    BootReport {
        phases,
        registration,
        source: resolved.source,
        agent,
        workload,
    }
}

async fn register(
    scheduler: &impl BootScheduler,
    reporter: &impl ProgressReporter,
    entry: &BootEntry,
) -> Option<BootRegistration> {
    reporter.step("checking boot registration...");
    match scheduler.ensure(entry).await {
        Ok(BootRegistration::Added) => {
            reporter.success("registered for start at boot");
            Some(BootRegistration::Added)
        }
        Ok(BootRegistration::AlreadyPresent) => {
            reporter.success("boot registration already present");
            Some(BootRegistration::AlreadyPresent)
        }
        Err(e) => {
            reporter.warn(&format!("could not register for start at boot: {e:#}"));
            None
        }
    }
}

/// Parse the preset, load the backup and, unless non-interactive, ask the
/// operator for a new instruction.
async fn gather_candidates(
    backup: &impl BackupStore,
    prompt: &impl InputPrompt,
    reporter: &impl ProgressReporter,
    opts: &BootOptions<'_>,
) -> Candidates {
    let preset_text = opts.settings.preset.trim();
    let preset = parse_instruction(preset_text);
    if preset.is_none() && !preset_text.is_empty() {
        reporter.warn("preset instruction lacks NZ_SERVER or NZ_CLIENT_SECRET, ignoring it");
    }

    let backup_config = match backup.load() {
        Ok(record) => record.map(AgentConfig::from),
        Err(e) => {
            reporter.warn(&format!("backup record unreadable, ignoring it: {e:#}"));
            None
        }
    };

    let interactive = if opts.non_interactive {
        None
    } else {
        show_menu(
            reporter,
            preset.as_ref(),
            backup_config.as_ref(),
            opts.settings.prompt_timeout_secs,
        );
        ask(backup, prompt, reporter, opts.settings).await
    };

    Candidates {
        interactive,
        preset,
        backup: backup_config,
    }
}

fn show_menu(
    reporter: &impl ProgressReporter,
    preset: Option<&AgentConfig>,
    backup: Option<&AgentConfig>,
    timeout_secs: u64,
) {
    if let Some(p) = preset {
        reporter.info(&format!("preset: {}", p.server));
    }
    if let Some(b) = backup {
        reporter.info(&format!("backup: {}", b.server));
    }
    reporter.info(&format!("choose within {timeout_secs}s:"));
    reporter.info("  1. paste an instruction and press Enter  -> use it (highest priority)");
    reporter.info("  2. press Enter                           -> use preset or backup now");
    reporter.info("  3. wait                                  -> use preset or backup");
}

async fn ask(
    backup: &impl BackupStore,
    prompt: &impl InputPrompt,
    reporter: &impl ProgressReporter,
    settings: &Settings,
) -> Option<AgentConfig> {
    let answer = match prompt.ask(PROMPT, settings.prompt_timeout()).await {
        Ok(PromptOutcome::Answered(line)) => line,
        Ok(PromptOutcome::TimedOut) => {
            reporter.info("countdown ended, continuing");
            return None;
        }
        Ok(PromptOutcome::Closed) => return None,
        Err(e) => {
            reporter.warn(&format!("could not read console input: {e:#}"));
            return None;
        }
    };
    if answer.trim().is_empty() {
        return None;
    }

    let Some(config) = parse_instruction(&answer) else {
        reporter.warn("input lacks NZ_SERVER or NZ_CLIENT_SECRET, discarding it");
        return None;
    };
    match backup.save(&BackupRecord::from(&config)) {
        Ok(()) => reporter.success("instruction saved as backup"),
        Err(e) => reporter.warn(&format!("could not save backup record: {e:#}")),
    }
    Some(config)
}
