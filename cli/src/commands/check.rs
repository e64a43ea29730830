//! `bootwarden check`: preview the next run without side effects.

use crate::app::AppContext;
use crate::application::services::config_check::{self as service, CheckReport};
use crate::infra::LocalHost;
use crate::output::OutputContext;

/// Print which configuration the next run would use.
pub fn run(app: &AppContext) {
    let report = service::inspect(
        &LocalHost::default(),
        &app.backup_store(),
        &app.settings,
        &app.layout,
        std::env::consts::ARCH,
    );
    print_report(&report, app, &app.output);
}

fn present(flag: bool) -> &'static str {
    if flag { "present" } else { "missing (will download)" }
}

fn print_report(report: &CheckReport, app: &AppContext, ctx: &OutputContext) {
    for warning in &report.warnings {
        ctx.warn(warning);
    }
    ctx.header("Configuration");
    ctx.kv("source        ", &report.source.to_string());
    if let Some(server) = &report.server {
        ctx.kv("server        ", server);
    }
    match (report.reconciliation, report.uuid.as_deref()) {
        (Some(outcome), Some(uuid)) => ctx.kv("identity      ", &format!("{outcome} ({uuid})")),
        (Some(outcome), None) => ctx.kv("identity      ", &outcome.to_string()),
        (None, _) => ctx.kv("identity      ", "agent will be skipped"),
    }

    ctx.header("Files");
    ctx.kv("workdir       ", &app.layout.workdir.display().to_string());
    ctx.kv("agent binary  ", present(report.agent_binary_present));
    ctx.kv("workload      ", present(report.workload_script_present));
    match &report.arch {
        Ok(arch) => ctx.kv("arch          ", arch.code()),
        Err(e) => ctx.warn(e),
    }
    ctx.kv(
        "autostart     ",
        if app.settings.autostart { "on" } else { "off" },
    );
    if !app.workload_env.is_empty() {
        let names: Vec<&str> = app.workload_env.iter().map(|(k, _)| k).collect();
        ctx.kv("workload env  ", &names.join(", "));
    }
}
