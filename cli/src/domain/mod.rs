//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod agent;
pub mod command;
pub mod env;
pub mod error;
pub mod kv;
pub mod platform;
pub mod reconcile;
pub mod schedule;
pub mod settings;
pub mod source;

pub use agent::{AgentConfig, BackupRecord};
pub use command::parse_instruction;
pub use env::WorkloadEnv;
pub use error::{PlatformError, SettingsError, SupervisorError};
pub use platform::AgentArch;
pub use reconcile::{ReconciledConfig, Reconciliation, reconcile};
pub use schedule::{BootEntry, ScheduleMerge};
pub use settings::{Layout, Settings};
pub use source::{Candidates, ConfigSource, ResolvedConfig};
