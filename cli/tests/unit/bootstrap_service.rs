//! Unit tests for the `bootstrap` orchestration service.
//!
//! Covers configuration source precedence, prompt handling, failure
//! isolation between phases and the four end-to-end reconciliation
//! scenarios (fresh host, unchanged rerun, changed secret, forced uuid).

#![allow(clippy::expect_used)]

use std::time::Duration;

use bootwarden::application::ports::{BootRegistration, PromptOutcome};
use bootwarden::application::services::agent_supervisor::AgentOutcome;
use bootwarden::application::services::bootstrap::{BootOptions, BootPhase, BootReport, run};
use bootwarden::domain::{BackupRecord, BootEntry, ConfigSource, Reconciliation, Settings, WorkloadEnv};

use crate::helpers::{layout, persisted};
use crate::mocks::{FakeHost, FakeScheduler, MemoryBackup, RecordingReporter, ScriptedPrompt};

const PRESET: &str = "NZ_SERVER=dash.example.com:443 NZ_TLS=true NZ_CLIENT_SECRET=secret1";

fn settings(preset: &str) -> Settings {
    Settings {
        preset: preset.to_string(),
        ..Settings::default()
    }
}

/// Host with both binaries present.
fn ready_host() -> FakeHost {
    let layout = layout();
    FakeHost::new()
        .with_file(&layout.agent_binary, "binary")
        .with_file(&layout.workload_script, "#!/bin/bash\n")
}

fn backup_record(server: &str) -> BackupRecord {
    BackupRecord {
        server: server.to_string(),
        secret: "backup-secret".to_string(),
        tls: false,
        uuid: None,
    }
}

struct Harness {
    host: FakeHost,
    backup: MemoryBackup,
    scheduler: FakeScheduler,
    prompt: ScriptedPrompt,
    reporter: RecordingReporter,
}

impl Harness {
    fn new(host: FakeHost) -> Self {
        Self {
            host,
            backup: MemoryBackup::default(),
            scheduler: FakeScheduler::returning(BootRegistration::Added),
            prompt: ScriptedPrompt::timing_out(),
            reporter: RecordingReporter::default(),
        }
    }

    async fn run(&self, settings: &Settings, non_interactive: bool) -> BootReport {
        let layout = layout();
        let entry = BootEntry::new("/srv/app/bootwarden", "/srv/app");
        run(
            &self.host,
            &self.backup,
            &self.scheduler,
            &self.prompt,
            &self.reporter,
            BootOptions {
                settings,
                layout: &layout,
                boot_entry: Some(&entry),
                non_interactive,
                workload_env: WorkloadEnv::new(),
                host_arch: "x86_64",
            },
        )
        .await
    }
}

fn reconciliation(report: &BootReport) -> Option<Reconciliation> {
    match &report.agent {
        Ok(AgentOutcome::Launched { reconciliation, .. }) => Some(*reconciliation),
        _ => None,
    }
}

// ── Phases ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_phases_run_in_order_and_end_idle() {
    let h = Harness::new(ready_host());
    let report = h.run(&settings(PRESET), true).await;
    assert_eq!(
        report.phases,
        vec![
            BootPhase::Init,
            BootPhase::ResolveConfig,
            BootPhase::LaunchAgent,
            BootPhase::LaunchWorkload,
            BootPhase::Idle,
        ]
    );
    assert_eq!(report.registration, Some(BootRegistration::Added));
}

#[tokio::test]
async fn test_registration_failure_is_a_warning() {
    let mut h = Harness::new(ready_host());
    h.scheduler = FakeScheduler::failing("crontab: not found");
    let report = h.run(&settings(PRESET), true).await;
    assert!(report.registration.is_none());
    assert_eq!(report.phases.last(), Some(&BootPhase::Idle));
    assert!(h.reporter.warnings().iter().any(|w| w.contains("crontab: not found")));
    assert!(report.agent.is_ok());
}

#[tokio::test]
async fn test_disabled_autostart_never_touches_scheduler() {
    let h = Harness::new(ready_host());
    let layout = layout();
    let settings = settings(PRESET);
    let report = run(
        &h.host,
        &h.backup,
        &h.scheduler,
        &h.prompt,
        &h.reporter,
        BootOptions {
            settings: &settings,
            layout: &layout,
            boot_entry: None,
            non_interactive: true,
            workload_env: WorkloadEnv::new(),
            host_arch: "x86_64",
        },
    )
    .await;
    assert_eq!(h.scheduler.calls(), 0);
    assert!(report.registration.is_none());
}

// ── Source precedence ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_interactive_input_wins_and_is_backed_up() {
    let mut h = Harness::new(ready_host());
    h.backup = MemoryBackup::with_record(backup_record("backup.example.com:1"));
    h.prompt = ScriptedPrompt::answering(
        "curl ... NZ_SERVER=typed.example.com:8008 NZ_CLIENT_SECRET=typed NZ_TLS=false",
    );

    let report = h.run(&settings(PRESET), false).await;

    assert_eq!(report.source, ConfigSource::Interactive);
    let saved = h.backup.saved().expect("backup saved");
    assert_eq!(saved.server, "typed.example.com:8008");
    assert_eq!(saved.secret, "typed");
    assert_eq!(h.backup.save_count(), 1);
    assert!(
        h.host
            .file(layout().agent_config)
            .expect("config")
            .starts_with("server: typed.example.com:8008\n")
    );
}

#[tokio::test]
async fn test_unparseable_input_is_discarded() {
    let mut h = Harness::new(ready_host());
    h.prompt = ScriptedPrompt::answering("NZ_SERVER=only-a-server:1");

    let report = h.run(&settings(PRESET), false).await;

    assert_eq!(report.source, ConfigSource::Preset);
    assert_eq!(h.backup.save_count(), 0);
    assert!(h.reporter.warnings().iter().any(|w| w.contains("discarding")));
}

#[tokio::test]
async fn test_empty_input_skips_wait_without_warning() {
    let mut h = Harness::new(ready_host());
    h.prompt = ScriptedPrompt::answering("");
    let report = h.run(&settings(PRESET), false).await;
    assert_eq!(report.source, ConfigSource::Preset);
    assert!(h.reporter.warnings().is_empty());
}

#[tokio::test]
async fn test_timeout_falls_back_to_backup() {
    let mut h = Harness::new(ready_host());
    h.backup = MemoryBackup::with_record(backup_record("backup.example.com:1"));

    let report = h.run(&settings(""), false).await;

    assert_eq!(report.source, ConfigSource::Backup);
    assert_eq!(h.prompt.asked(), vec![Duration::from_secs(20)]);
    assert!(h.reporter.contains("countdown ended"));
    assert!(h.reporter.contains("backup: backup.example.com:1"));
}

#[tokio::test]
async fn test_closed_input_is_no_input() {
    let mut h = Harness::new(ready_host());
    h.prompt = ScriptedPrompt::with(PromptOutcome::Closed);
    let report = h.run(&settings(PRESET), false).await;
    assert_eq!(report.source, ConfigSource::Preset);
}

#[tokio::test]
async fn test_non_interactive_never_prompts() {
    let h = Harness::new(ready_host());
    let report = h.run(&settings(PRESET), true).await;
    assert!(h.prompt.asked().is_empty());
    assert_eq!(report.source, ConfigSource::Preset);
}

#[tokio::test]
async fn test_custom_timeout_is_used() {
    let h = Harness::new(ready_host());
    let s = Settings {
        prompt_timeout_secs: 3,
        ..settings(PRESET)
    };
    h.run(&s, false).await;
    assert_eq!(h.prompt.asked(), vec![Duration::from_secs(3)]);
}

#[tokio::test]
async fn test_corrupt_backup_is_ignored_with_warning() {
    let mut h = Harness::new(ready_host());
    h.backup = MemoryBackup::corrupt();
    let report = h.run(&settings(""), true).await;
    assert_eq!(report.source, ConfigSource::None);
    assert!(h.reporter.warnings().iter().any(|w| w.contains("backup record unreadable")));
}

#[tokio::test]
async fn test_malformed_preset_warns_and_falls_through() {
    let mut h = Harness::new(ready_host());
    h.backup = MemoryBackup::with_record(backup_record("backup.example.com:1"));
    let report = h.run(&settings("NZ_TLS=true"), true).await;
    assert_eq!(report.source, ConfigSource::Backup);
    assert!(h.reporter.warnings().iter().any(|w| w.contains("preset")));
}

// ── Failure isolation ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_configuration_skips_agent_but_starts_workload() {
    let h = Harness::new(ready_host());
    let report = h.run(&settings(""), true).await;

    assert_eq!(report.source, ConfigSource::None);
    assert!(matches!(report.agent, Ok(AgentOutcome::Skipped)));
    assert!(report.workload.is_ok());
    let launches = h.host.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].name, "workload");
}

#[tokio::test]
async fn test_agent_failure_does_not_stop_workload() {
    let layout = layout();
    let host = FakeHost::new()
        .with_file(&layout.workload_script, "#!/bin/bash\n")
        .failing_downloads();
    let h = Harness::new(host);

    let report = h.run(&settings(PRESET), true).await;

    assert!(report.agent.is_err());
    assert!(report.workload.is_ok());
    assert_eq!(report.phases.last(), Some(&BootPhase::Idle));
    assert!(h.reporter.warnings().iter().any(|w| w.starts_with("agent not started")));
}

#[tokio::test]
async fn test_workload_failure_is_reported() {
    let layout = layout();
    let host = FakeHost::new()
        .with_file(&layout.agent_binary, "binary")
        .failing_downloads();
    let h = Harness::new(host);

    let report = h.run(&settings(PRESET), true).await;

    assert!(report.agent.is_ok());
    assert!(report.workload.is_err());
    assert!(h.reporter.warnings().iter().any(|w| w.starts_with("workload not started")));
}

// ── End-to-end reconciliation scenarios ──────────────────────────────────────

#[tokio::test]
async fn test_scenario_fresh_host_downloads_and_resets() {
    let layout = layout();
    let host = FakeHost::new().with_archive_member(&layout.agent_binary);
    let h = Harness::new(host);

    let report = h.run(&settings(PRESET), true).await;

    assert_eq!(reconciliation(&report), Some(Reconciliation::Reset));
    assert_eq!(
        h.host.file(&layout.agent_config).expect("config"),
        "server: dash.example.com:443\nclient_secret: secret1\ntls: true\n"
    );
    assert_eq!(h.host.events_starting_with("download ").len(), 2);
    assert_eq!(h.host.launches().len(), 2);
}

#[tokio::test]
async fn test_scenario_unchanged_rerun_keeps_identity() {
    let layout = layout();
    let host = ready_host().with_file(
        &layout.agent_config,
        &persisted("dash.example.com:443", "secret1", "true", "3f1c-77aa"),
    );
    let h = Harness::new(host);

    let report = h.run(&settings(PRESET), true).await;

    assert_eq!(reconciliation(&report), Some(Reconciliation::Stable));
    assert!(
        h.host
            .file(&layout.agent_config)
            .expect("config")
            .ends_with("uuid: 3f1c-77aa\n")
    );
}

#[tokio::test]
async fn test_scenario_changed_secret_resets_identity() {
    let layout = layout();
    let host = ready_host().with_file(
        &layout.agent_config,
        &persisted("dash.example.com:443", "old-secret", "true", "3f1c-77aa"),
    );
    let h = Harness::new(host);

    let report = h.run(&settings(PRESET), true).await;

    assert_eq!(reconciliation(&report), Some(Reconciliation::Reset));
    assert!(
        !h.host
            .file(&layout.agent_config)
            .expect("config")
            .contains("uuid")
    );
}

#[tokio::test]
async fn test_scenario_forced_uuid_overrides_persisted() {
    let layout = layout();
    let host = ready_host().with_file(
        &layout.agent_config,
        &persisted("dash.example.com:443", "secret1", "true", "3f1c-77aa"),
    );
    let h = Harness::new(host);
    let preset = format!("{PRESET} NZ_UUID=forced-0001");

    let report = h.run(&settings(&preset), true).await;

    assert_eq!(reconciliation(&report), Some(Reconciliation::Forced));
    assert!(
        h.host
            .file(&layout.agent_config)
            .expect("config")
            .ends_with("uuid: forced-0001\n")
    );
}
