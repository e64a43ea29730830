//! Application service: workload script provisioning and launch.

use anyhow::{Context, Result};

use crate::application::ports::{LaunchSpec, ObservedChild, ProgressReporter, SupervisorHost};
use crate::application::services::log_exit;
use crate::domain::{Layout, SupervisorError, WorkloadEnv};

pub struct WorkloadOptions<'a> {
    pub layout: &'a Layout,
    pub download_url: &'a str,
    pub interpreter: &'a str,
    pub args: &'a [String],
}

/// Result of a successful workload launch.
#[derive(Debug)]
pub struct WorkloadOutcome {
    pub fetched: bool,
    pub child: ObservedChild,
}

/// Ensure the workload script exists and start it with `env` applied on top
/// of the inherited environment.
///
/// # Errors
///
/// Returns an error if the script cannot be downloaded or made executable,
/// or the interpreter cannot be spawned.
pub async fn ensure_and_launch(
    host: &impl SupervisorHost,
    reporter: &impl ProgressReporter,
    env: WorkloadEnv,
    opts: &WorkloadOptions<'_>,
) -> Result<WorkloadOutcome> {
    let script = &opts.layout.workload_script;

    let fetched = !host.exists(script);
    if fetched {
        reporter.step("downloading workload script...");
        host.download(opts.download_url, script)
            .await
            .map_err(|e| SupervisorError::FetchFailed {
                what: "workload script",
                url: opts.download_url.to_string(),
                reason: format!("{e:#}"),
            })?;
    }
    host.set_executable(script)
        .with_context(|| format!("chmod {}", script.display()))?;

    let mut args = Vec::with_capacity(opts.args.len() + 1);
    args.push(script.display().to_string());
    args.extend(opts.args.iter().cloned());

    if !env.is_empty() {
        reporter.step(&format!("passing {} custom variable(s) to workload", env.len()));
    }
    let spec = LaunchSpec {
        name: "workload",
        program: opts.interpreter.into(),
        args,
        workdir: opts.layout.workdir.clone(),
        env,
    };
    let handle = host.launch(&spec).context("starting workload")?;
    reporter.success("workload started");

    let child = handle.on_exit(log_exit);
    Ok(WorkloadOutcome { fetched, child })
}
