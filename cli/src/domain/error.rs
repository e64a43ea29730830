//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Platform errors ───────────────────────────────────────────────────────────

/// Errors raised while mapping the host to an agent release asset.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error(
        "No agent build for architecture '{0}'. Supported: x86_64 (amd64), aarch64 (arm64). \
Set agent.arch in the settings file to override."
    )]
    Unsupported(String),
}

// ── Settings errors ───────────────────────────────────────────────────────────

/// Errors related to bootstrap settings and their sources.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Prompt timeout must be at least 1 second (got {0}).")]
    ZeroTimeout(u64),

    #[error("Invalid environment assignment '{0}': expected NAME=value or NAME=\"value\".")]
    InvalidAssignment(String),

    #[error("Agent download URL template must contain '{{arch}}': {0}")]
    MissingArchPlaceholder(String),

    #[error("{field} must not be empty.")]
    EmptyField { field: &'static str },
}

// ── Supervisor errors ─────────────────────────────────────────────────────────

/// Errors raised by the agent and workload supervisors.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Archive {archive} did not contain the agent binary '{binary}'.")]
    BinaryMissingAfterExtract { archive: String, binary: String },

    #[error("Could not download {what} from {url}: {reason}")]
    FetchFailed {
        what: &'static str,
        url: String,
        reason: String,
    },
}
