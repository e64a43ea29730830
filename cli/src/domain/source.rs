//! Configuration source precedence.
//!
//! Exactly one source supplies the agent configuration for a run:
//! interactive input, then the preset instruction, then the backup record.
//! Fields are never merged across sources.

use std::fmt;

use crate::domain::agent::AgentConfig;

/// Where the agent configuration for this run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Interactive,
    Preset,
    Backup,
    None,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interactive => "console input",
            Self::Preset => "preset instruction",
            Self::Backup => "backup record",
            Self::None => "none",
        })
    }
}

/// Candidate configurations, each already parsed from its source.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub interactive: Option<AgentConfig>,
    pub preset: Option<AgentConfig>,
    pub backup: Option<AgentConfig>,
}

/// The winning source and its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub source: ConfigSource,
    pub config: Option<AgentConfig>,
}

impl Candidates {
    /// Pick the highest-priority actionable candidate.
    #[must_use]
    pub fn resolve(self) -> ResolvedConfig {
        let ordered = [
            (ConfigSource::Interactive, self.interactive),
            (ConfigSource::Preset, self.preset),
            (ConfigSource::Backup, self.backup),
        ];
        ordered
            .into_iter()
            .find_map(|(source, config)| {
                config
                    .filter(AgentConfig::is_actionable)
                    .map(|config| ResolvedConfig {
                        source,
                        config: Some(config),
                    })
            })
            .unwrap_or(ResolvedConfig {
                source: ConfigSource::None,
                config: None,
            })
    }
}
