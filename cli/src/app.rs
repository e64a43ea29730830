//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the layered settings (defaults, YAML file, flags), the
//! resolved file layout and the output context. Built once in `Cli::run()`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::env::parse_assignments;
use crate::domain::{BootEntry, Layout, Settings, WorkloadEnv};
use crate::infra::backup::JsonBackupStore;
use crate::infra::settings::{YamlSettingsStore, load_env_file};
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip the console prompt (also set by `CI` / `BOOTWARDEN_YES` env vars).
    pub yes: bool,
    /// Do not register the `@reboot` entry.
    pub no_autostart: bool,
}

/// Where settings come from, highest priority last.
#[derive(Default)]
pub struct SourceFlags {
    pub config: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub preset: Option<String>,
    pub timeout: Option<u64>,
    /// Inline `NAME=value` assignments, one string per `--env`.
    pub env: Vec<String>,
    pub env_file: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
    pub sources: SourceFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Effective settings after all layers were applied.
    pub settings: Settings,
    /// Absolute file locations inside the work directory.
    pub layout: Layout,
    /// Extra environment for the workload.
    pub workload_env: WorkloadEnv,
    /// Absolute settings file path, re-passed on boot-time re-execution.
    pub config_path: Option<PathBuf>,
    /// When `true`, skip the console prompt.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or
    /// `BOOTWARDEN_YES` environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the work directory is unusable, the settings file
    /// or env file cannot be read, or a setting is invalid.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("BOOTWARDEN_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let sources = &flags.sources;
        let workdir = resolve_workdir(sources.workdir.as_deref())?;
        let config_path = sources
            .config
            .as_deref()
            .map(absolute)
            .transpose()?;

        let mut settings = YamlSettingsStore::new(config_path.clone()).load()?;
        apply_overrides(&mut settings, sources, flags.behaviour.no_autostart);
        settings.validate()?;

        let layout = settings.layout(&workdir);
        let workload_env = build_workload_env(&settings, sources, &workdir)?;

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            settings,
            layout,
            workload_env,
            config_path,
            non_interactive,
        })
    }

    /// Progress reporter over this context's output.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Backup store at the configured location.
    #[must_use]
    pub fn backup_store(&self) -> JsonBackupStore {
        JsonBackupStore::new(self.layout.backup_file.clone())
    }

    /// The `@reboot` entry re-running this executable in the work directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path of the running executable is unknown.
    pub fn boot_entry(&self) -> Result<BootEntry> {
        let exe = std::env::current_exe().context("cannot determine executable path")?;
        let args = self
            .config_path
            .as_ref()
            .map(|p| vec!["--config".to_string(), p.display().to_string()])
            .unwrap_or_default();
        Ok(BootEntry::new(exe, &self.layout.workdir).with_args(args))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(cwd.join(path))
}

fn resolve_workdir(flag: Option<&Path>) -> Result<PathBuf> {
    let dir = match flag {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let dir = dir
        .canonicalize()
        .with_context(|| format!("work directory {} is not usable", dir.display()))?;
    if !dir.is_dir() {
        anyhow::bail!("work directory {} is not a directory", dir.display());
    }
    Ok(dir)
}

/// Apply flag values on top of the file settings.
pub fn apply_overrides(settings: &mut Settings, sources: &SourceFlags, no_autostart: bool) {
    if let Some(preset) = sources.preset.as_deref().filter(|p| !p.trim().is_empty()) {
        settings.preset = preset.to_string();
    }
    if let Some(timeout) = sources.timeout {
        settings.prompt_timeout_secs = timeout;
    }
    if let Some(env_file) = &sources.env_file {
        settings.env_file = Some(env_file.clone());
    }
    if no_autostart {
        settings.autostart = false;
    }
}

/// Env file, then `env:` from the settings file, then `--env`; later wins.
fn build_workload_env(
    settings: &Settings,
    sources: &SourceFlags,
    workdir: &Path,
) -> Result<WorkloadEnv> {
    let mut env = WorkloadEnv::new();
    if let Some(file) = &settings.env_file {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            workdir.join(file)
        };
        env.extend(load_env_file(&path)?);
    }
    for (name, value) in &settings.env {
        env.set(name.clone(), value.clone());
    }
    for assignment in &sources.env {
        env.extend(parse_assignments(assignment)?);
    }
    Ok(env)
}
