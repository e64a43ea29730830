//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags, SourceFlags};
use crate::commands;

/// Bootstrap and supervise a telemetry agent and a workload script
#[derive(Parser)]
#[command(name = "bootwarden", version, propagate_version = true)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also disabled whenever `NO_COLOR` is set)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Skip the console prompt and use the preset or backup
    /// (also set by the `CI` / `BOOTWARDEN_YES` env vars)
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// YAML settings file
    #[arg(long, global = true, env = "BOOTWARDEN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the agent, the workload script and their files
    #[arg(long, global = true, env = "BOOTWARDEN_WORKDIR", value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Instruction used when no console input is given
    /// (e.g. "NZ_SERVER=host:443 NZ_TLS=true NZ_CLIENT_SECRET=...")
    #[arg(long, global = true, env = "NZ_CMD", value_name = "INSTRUCTION")]
    pub preset: Option<String>,

    /// Seconds to wait for console input
    #[arg(long, global = true, env = "BOOTWARDEN_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not register the bootstrap in the crontab
    #[arg(long, global = true)]
    pub no_autostart: bool,

    /// Extra workload environment: NAME=value or NAME="value" (repeatable)
    #[arg(long = "env", global = true, value_name = "ASSIGNMENTS")]
    pub env: Vec<String>,

    /// File of `export NAME="value"` lines for the workload
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision and launch both processes, then stay alive (default)
    Run,

    /// Show which configuration the next run would use, without changing anything
    Check,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be built or the command fails
    /// before reaching its steady state.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            yes,
            config,
            workdir,
            preset,
            timeout,
            no_autostart,
            env,
            env_file,
            command,
        } = self;

        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { yes, no_autostart },
            sources: SourceFlags {
                config,
                workdir,
                preset,
                timeout,
                env,
                env_file,
            },
        })?;

        match command.unwrap_or(Command::Run) {
            Command::Run => commands::run::run(&app).await,
            Command::Check => {
                commands::check::run(&app);
                Ok(())
            }
        }
    }
}
