//! Long-running child processes for the supervisors.
//!
//! The child inherits stdio and the parent environment. A watcher task owns
//! the `tokio::process::Child` and reports its exit over a oneshot channel.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::sync::oneshot;

use crate::application::ports::{ChildExit, ChildHandle, LaunchSpec, ProcessLauncher};
use crate::infra::fs::LocalHost;

impl ProcessLauncher for LocalHost {
    fn launch(&self, spec: &LaunchSpec) -> Result<ChildHandle> {
        let mut child = tokio::process::Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.workdir)
            .envs(spec.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn {}", spec.program.display()))?;

        let pid = child.id();
        tracing::info!(process = spec.name, pid, program = %spec.program.display(), "launched");

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => exit_of(status),
                Err(e) => ChildExit::Unknown(e.to_string()),
            };
            // Receiver may be gone if nobody observes this child.
            let _ = tx.send(exit);
        });

        Ok(ChildHandle::new(spec.name, pid, rx))
    }
}

fn exit_of(status: ExitStatus) -> ChildExit {
    if let Some(code) = status.code() {
        return ChildExit::Code(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return ChildExit::Signal(sig);
        }
    }
    ChildExit::Unknown(status.to_string())
}
