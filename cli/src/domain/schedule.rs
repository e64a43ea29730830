//! Boot-time re-execution entry for the user's crontab.

use std::path::PathBuf;

/// The `@reboot` line that restarts the bootstrap after a host reboot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootEntry {
    /// Absolute path of the bootstrap executable; also the dedup marker.
    pub program: PathBuf,
    /// Directory the bootstrap is started from.
    pub workdir: PathBuf,
    /// Extra arguments passed on re-execution.
    pub args: Vec<String>,
}

/// Outcome of merging a [`BootEntry`] into an existing schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleMerge {
    /// An existing line already references the program; nothing to write.
    AlreadyPresent,
    /// The full new schedule to install.
    Updated(String),
}

impl BootEntry {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Render the crontab line.
    #[must_use]
    pub fn line(&self) -> String {
        let args: String = self.args.iter().map(|a| format!(" \"{a}\"")).collect();
        format!(
            "@reboot cd \"{}\" && \"{}\"{args} > /dev/null 2>&1 &",
            self.workdir.display(),
            self.program.display()
        )
    }

    fn marker(&self) -> String {
        self.program.display().to_string()
    }

    /// Append this entry to `current` unless a line already contains the
    /// program path verbatim.
    #[must_use]
    pub fn merge_into(&self, current: &str) -> ScheduleMerge {
        let marker = self.marker();
        if current.lines().any(|l| l.contains(&marker)) {
            return ScheduleMerge::AlreadyPresent;
        }
        let trimmed = current.trim_end();
        let mut schedule = String::with_capacity(trimmed.len() + marker.len() + 64);
        if !trimmed.is_empty() {
            schedule.push_str(trimmed);
            schedule.push('\n');
        }
        schedule.push_str(&self.line());
        schedule.push('\n');
        ScheduleMerge::Updated(schedule)
    }
}
