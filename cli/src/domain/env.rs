//! Custom environment for the workload process.
//!
//! The workload script reads its options from environment variables. The
//! orchestrator builds them into an explicit [`WorkloadEnv`] and the launcher
//! applies it to the child only, leaving the bootstrap's own environment
//! untouched.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::domain::error::SettingsError;

/// Extra environment variables applied to the workload child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadEnv {
    vars: BTreeMap<String, String>,
}

impl WorkloadEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one variable. Later values replace earlier ones.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Merge `other` into `self`; `other` wins on conflicts.
    pub fn extend(&mut self, other: WorkloadEnv) {
        self.vars.extend(other.vars);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One assignment at the start of the input, with an optional `export`.
/// The bare alternative may be empty but never starts with a quote.
pub static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"^(?:export\s+)?([A-Za-z0-9_]+)=(?:"([^"]*)"|([^"\s]\S*)?)"#)
        .expect("valid regex")
});

fn first_word(input: &str) -> String {
    input.split_whitespace().next().unwrap_or(input).to_string()
}

/// Parse whitespace-separated `NAME="value"` / `NAME=value` assignments.
///
/// A leading `export` keyword before an assignment is ignored, so lines
/// copied from a shell profile work unchanged.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidAssignment`] for a word that is not an
/// assignment or an unterminated quoted value.
pub fn parse_assignments(input: &str) -> Result<WorkloadEnv> {
    let mut env = WorkloadEnv::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let Some(caps) = ASSIGNMENT_RE.captures(rest) else {
            return Err(SettingsError::InvalidAssignment(first_word(rest)).into());
        };
        let end = caps.get(0).map_or(0, |m| m.end());
        let remainder = &rest[end..];
        if !remainder.is_empty() && !remainder.starts_with(char::is_whitespace) {
            return Err(SettingsError::InvalidAssignment(first_word(rest)).into());
        }

        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        let name = caps.get(1).map_or("", |m| m.as_str());
        env.set(name, value);
        rest = remainder.trim_start();
    }

    Ok(env)
}

/// Parse an `env.sh`-style file: one or more assignments per line, blank
/// lines and `#` comments ignored.
///
/// # Errors
///
/// Returns the first invalid assignment, prefixed with its line number.
pub fn parse_env_file(content: &str) -> Result<WorkloadEnv> {
    let mut env = WorkloadEnv::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = parse_assignments(line)
            .map_err(|e| anyhow::anyhow!("line {}: {e}", idx + 1))?;
        env.extend(parsed);
    }
    Ok(env)
}
