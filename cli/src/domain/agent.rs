//! Agent connection parameters and the interactive backup record.
//!
//! Pure data types: no I/O.

use serde::{Deserialize, Deserializer, Serialize};

/// Connection parameters for the telemetry agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Dashboard endpoint, `host:port`.
    pub server: String,
    /// Opaque client secret issued by the dashboard.
    pub secret: String,
    /// Whether the agent connects over TLS.
    pub tls: bool,
    /// Forced agent identity. `None` lets reconciliation decide.
    pub uuid: Option<String>,
}

impl AgentConfig {
    /// A config is actionable only when both `server` and `secret` are non-empty.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !self.server.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

/// Last successfully parsed interactive instruction, persisted as JSON.
///
/// `tls` is written as a boolean but also read from the string form
/// (`"true"` / `"false"`) used by older backup files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub server: String,
    pub secret: String,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub tls: bool,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl From<&AgentConfig> for BackupRecord {
    fn from(config: &AgentConfig) -> Self {
        Self {
            server: config.server.clone(),
            secret: config.secret.clone(),
            tls: config.tls,
            uuid: config.uuid.clone(),
        }
    }
}

impl From<BackupRecord> for AgentConfig {
    fn from(record: BackupRecord) -> Self {
        Self {
            server: record.server,
            secret: record.secret,
            tls: record.tls,
            uuid: record.uuid.filter(|u| !u.trim().is_empty()),
        }
    }
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Text(s) => s.trim().eq_ignore_ascii_case("true"),
    })
}
