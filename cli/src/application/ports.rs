//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::{BackupRecord, BootEntry, WorkloadEnv};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts short-lived process execution so infrastructure can be swapped
/// or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a neutral informational line.
    fn info(&self, message: &str);
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Local filesystem access used by the supervisors.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Mark a file executable (`0o755`).
    fn set_executable(&self, path: &Path) -> Result<()>;
}

/// Fetches a remote artifact into a local file.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    /// Download `url` to `dest`. On failure `dest` is left untouched.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Unpacks downloaded archives.
#[allow(async_fn_in_trait)]
pub trait ArchiveExtractor {
    /// Extract every entry of the zip `archive` into `into`.
    async fn extract_zip(&self, archive: &Path, into: &Path) -> Result<()>;
}

/// Starts long-running child processes without waiting for them.
pub trait ProcessLauncher {
    /// Spawn the process described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn launch(&self, spec: &LaunchSpec) -> Result<ChildHandle>;
}

/// Composite trait: everything a supervisor needs from the host.
pub trait SupervisorHost: LocalFs + Downloader + ArchiveExtractor + ProcessLauncher {}

/// Blanket implementation: any type implementing all four sub-traits is a `SupervisorHost`.
impl<T> SupervisorHost for T where T: LocalFs + Downloader + ArchiveExtractor + ProcessLauncher {}

// ── Child Process Types ───────────────────────────────────────────────────────

/// What to launch and how.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Short label used in logs (`agent`, `workload`).
    pub name: &'static str,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    /// Applied on top of the inherited environment.
    pub env: WorkloadEnv,
}

/// How a supervised child ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildExit {
    /// Exited with a status code.
    Code(i32),
    /// Killed by a signal (Unix).
    Signal(i32),
    /// The exit status could not be collected.
    Unknown(String),
}

impl ChildExit {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Code(0))
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {code}"),
            Self::Signal(sig) => write!(f, "signal {sig}"),
            Self::Unknown(reason) => write!(f, "unknown status ({reason})"),
        }
    }
}

/// Handle to a freshly launched child. Fire-and-forget: nothing blocks on
/// it; register a continuation with [`ChildHandle::on_exit`].
#[derive(Debug)]
pub struct ChildHandle {
    pub name: &'static str,
    pub pid: Option<u32>,
    exit: oneshot::Receiver<ChildExit>,
}

impl ChildHandle {
    #[must_use]
    pub fn new(name: &'static str, pid: Option<u32>, exit: oneshot::Receiver<ChildExit>) -> Self {
        Self { name, pid, exit }
    }

    /// Run `observer` once the child exits, on a detached task.
    ///
    /// The observer may fire at any time, including after the caller has
    /// moved on. Must be called from within a tokio runtime.
    pub fn on_exit<F>(self, observer: F) -> ObservedChild
    where
        F: FnOnce(&'static str, &ChildExit) + Send + 'static,
    {
        let Self { name, pid, exit } = self;
        let task = tokio::spawn(async move {
            let status = exit
                .await
                .unwrap_or_else(|_| ChildExit::Unknown("exit watcher dropped".to_string()));
            observer(name, &status);
            status
        });
        ObservedChild { name, pid, task }
    }
}

/// A launched child with its exit observer registered.
#[derive(Debug)]
pub struct ObservedChild {
    pub name: &'static str,
    pub pid: Option<u32>,
    task: JoinHandle<ChildExit>,
}

impl ObservedChild {
    /// Wait for the child to exit and its observer to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the observer task panicked.
    pub async fn wait(self) -> Result<ChildExit> {
        self.task
            .await
            .map_err(|e| anyhow::anyhow!("{} exit observer failed: {e}", self.name))
    }
}

// ── State Ports ───────────────────────────────────────────────────────────────

/// Persistence of the last interactive instruction.
pub trait BackupStore {
    /// Load the backup, returning `None` if none has been written.
    fn load(&self) -> Result<Option<BackupRecord>>;
    /// Replace the backup.
    fn save(&self, record: &BackupRecord) -> Result<()>;
}

// ── Boot Registration Port ────────────────────────────────────────────────────

/// Result of [`BootScheduler::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootRegistration {
    Added,
    AlreadyPresent,
}

/// Registers the bootstrap for re-execution at host boot.
#[allow(async_fn_in_trait)]
pub trait BootScheduler {
    /// Ensure `entry` is scheduled, without duplicating an existing one.
    async fn ensure(&self, entry: &BootEntry) -> Result<BootRegistration>;
}

// ── Console Prompt Port ───────────────────────────────────────────────────────

/// Result of a bounded console prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// A line was entered (trimmed; may be empty).
    Answered(String),
    /// The timeout expired first.
    TimedOut,
    /// Input reached end-of-file.
    Closed,
}

/// Reads one line from the operator with a deadline.
#[allow(async_fn_in_trait)]
pub trait InputPrompt {
    /// Show `prompt` and wait at most `timeout` for a line.
    ///
    /// Exactly one of input arrival and timeout produces the outcome.
    async fn ask(&self, prompt: &str, timeout: Duration) -> Result<PromptOutcome>;
}
