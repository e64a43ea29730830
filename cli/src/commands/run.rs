//! `bootwarden run`: provision, launch and stay alive.

use anyhow::Result;
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::application::ports::ObservedChild;
use crate::application::services::agent_supervisor::AgentOutcome;
use crate::application::services::bootstrap::{self as service, BootOptions, BootReport};
use crate::infra::LocalHost;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::crontab::CrontabScheduler;
use crate::infra::prompt::TerminalPrompt;
use crate::output::OutputContext;

/// Run the bootstrap and then suspend forever.
///
/// # Errors
///
/// Returns an error only if the boot entry cannot be built; everything after
/// that is reported and the process stays alive.
pub async fn run(app: &AppContext) -> Result<()> {
    let ctx = &app.output;
    ctx.banner(concat!("bootwarden ", env!("CARGO_PKG_VERSION")));
    ctx.kv("workdir", &app.layout.workdir.display().to_string());

    let boot_entry = if app.settings.autostart {
        Some(app.boot_entry()?)
    } else {
        None
    };

    let host = LocalHost::new(ctx.show_progress());
    let report = service::run(
        &host,
        &app.backup_store(),
        &CrontabScheduler::new(TokioCommandRunner::default()),
        &TerminalPrompt::stdin(),
        &app.terminal_reporter(),
        BootOptions {
            settings: &app.settings,
            layout: &app.layout,
            boot_entry: boot_entry.as_ref(),
            non_interactive: app.non_interactive,
            workload_env: app.workload_env.clone(),
            host_arch: std::env::consts::ARCH,
        },
    )
    .await;

    print_summary(&report, ctx);
    tracing::info!(phases = ?report.phases, "entering idle phase");

    // Observers log each exit; nothing is restarted.
    for child in supervised(report) {
        if let Err(e) = child.wait().await {
            tracing::warn!(error = %e, "lost track of a supervised process");
        }
    }
    tracing::info!("no supervised process left, staying alive");

    std::future::pending::<()>().await;
    Ok(())
}

fn supervised(report: BootReport) -> Vec<ObservedChild> {
    let mut children = Vec::new();
    if let Ok(AgentOutcome::Launched { child, .. }) = report.agent {
        children.push(child);
    }
    if let Ok(outcome) = report.workload {
        children.push(outcome.child);
    }
    children
}

fn print_summary(report: &BootReport, ctx: &OutputContext) {
    if ctx.quiet {
        return;
    }
    ctx.header("Summary");
    ctx.kv("source  ", &report.source.to_string());
    let agent = match &report.agent {
        Ok(AgentOutcome::Skipped) => "skipped".to_string(),
        Ok(AgentOutcome::Launched {
            reconciliation,
            child,
            ..
        }) => launched(child.pid, &format!("identity {reconciliation}")),
        Err(_) => failed(ctx),
    };
    ctx.kv("agent   ", &agent);
    let workload = match &report.workload {
        Ok(outcome) => launched(outcome.child.pid, "running"),
        Err(_) => failed(ctx),
    };
    ctx.kv("workload", &workload);
    ctx.info("staying alive; press Ctrl+C to stop");
}

fn failed(ctx: &OutputContext) -> String {
    "failed".style(ctx.styles.error).to_string()
}

fn launched(pid: Option<u32>, detail: &str) -> String {
    match pid {
        Some(pid) => format!("pid {pid}, {detail}"),
        None => detail.to_string(),
    }
}
