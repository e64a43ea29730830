//! bootwarden - bootstrap and supervise a telemetry agent and a workload script

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bootwarden::cli::Cli;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so they never interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
