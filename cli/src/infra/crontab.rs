//! `@reboot` registration through the user's crontab.

use anyhow::{Context, Result};

use crate::application::ports::{BootRegistration, BootScheduler, CommandRunner};
use crate::domain::{BootEntry, ScheduleMerge};

/// Installs boot entries with `crontab -l` / `crontab -`.
pub struct CrontabScheduler<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> CrontabScheduler<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Current schedule. A failing `crontab -l` (no crontab yet) is empty.
    async fn current(&self) -> String {
        match self.runner.run("crontab", &["-l"]).await {
            Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).into_owned(),
            Ok(out) => {
                tracing::debug!(
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "crontab -l failed, assuming empty schedule"
                );
                String::new()
            }
            Err(e) => {
                tracing::debug!(error = %e, "crontab -l unavailable, assuming empty schedule");
                String::new()
            }
        }
    }
}

impl<R: CommandRunner> BootScheduler for CrontabScheduler<R> {
    async fn ensure(&self, entry: &BootEntry) -> Result<BootRegistration> {
        let current = self.current().await;
        let ScheduleMerge::Updated(schedule) = entry.merge_into(&current) else {
            return Ok(BootRegistration::AlreadyPresent);
        };

        let out = self
            .runner
            .run_with_stdin("crontab", &["-"], schedule.as_bytes())
            .await
            .context("installing crontab")?;
        if !out.status.success() {
            anyhow::bail!(
                "crontab rejected the schedule: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(BootRegistration::Added)
    }
}
