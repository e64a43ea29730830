//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod agent_supervisor;
pub mod bootstrap;
pub mod config_check;
pub mod workload_supervisor;

use crate::application::ports::ChildExit;

/// Exit observer shared by both supervisors. Runs on a detached task, so it
/// logs instead of reporting.
pub(crate) fn log_exit(name: &'static str, status: &ChildExit) {
    if status.is_success() {
        tracing::info!(process = name, "exited cleanly");
    } else {
        tracing::warn!(process = name, %status, "exited abnormally, not restarting");
    }
}
