//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, downloads, archive extraction, crontab and console input.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod archive;
pub mod backup;
pub mod command_runner;
pub mod crontab;
pub mod download;
pub mod fs;
pub mod process;
pub mod prompt;
pub mod settings;

pub use fs::LocalHost;
