//! Agent identity reconciliation.
//!
//! Decides whether a freshly requested connection may keep the `uuid`
//! recorded in the existing agent configuration file, so that re-running the
//! bootstrap does not register the host as a new node unless the operator
//! changed the connection parameters.

use std::fmt;

use crate::domain::agent::AgentConfig;
use crate::domain::kv::KeyValues;

/// How the identity of the written configuration was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The instruction carried `NZ_UUID=`; no comparison was made.
    Forced,
    /// Server, secret and TLS matched the persisted file; its uuid is kept.
    Stable,
    /// No usable persisted identity, or a connection parameter changed.
    Reset,
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forced => "forced",
            Self::Stable => "stable",
            Self::Reset => "reset",
        })
    }
}

/// Result of [`reconcile`]: the decision plus the text to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledConfig {
    pub outcome: Reconciliation,
    pub uuid: Option<String>,
    pub text: String,
}

/// The four fields of a previously written agent configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAgentConfig {
    pub server: String,
    pub secret: String,
    pub tls: String,
    pub uuid: String,
}

impl PersistedAgentConfig {
    /// Parse a configuration file. Returns `None` unless all four fields
    /// are present.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let kv = KeyValues::parse(text);
        let uuid = leading_identity(kv.get("uuid")?);
        if uuid.is_empty() {
            return None;
        }
        Some(Self {
            server: kv.get("server")?.to_string(),
            secret: kv.get("client_secret")?.to_string(),
            tls: kv.get("tls")?.to_string(),
            uuid: uuid.to_string(),
        })
    }

    fn matches(&self, requested: &AgentConfig) -> bool {
        normalize(&self.server) == normalize(&requested.server)
            && normalize(&self.secret) == normalize(&requested.secret)
            && is_truthy(&self.tls) == requested.tls
    }
}

fn leading_identity(value: &str) -> &str {
    let end = value
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-'))
        .map_or(value.len(), |(i, _)| i);
    &value[..end]
}

/// Strip quote characters and surrounding whitespace.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.replace(['"', '\''], "").trim().to_string()
}

/// `true`, `1` and `on` (any case, quotes stripped) are true; all else false.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let v = normalize(value).to_ascii_lowercase();
    matches!(v.as_str(), "true" | "1" | "on")
}

/// Render agent configuration text in the fixed key order.
#[must_use]
pub fn render_agent_config(server: &str, secret: &str, tls: bool, uuid: Option<&str>) -> String {
    let mut text = format!("server: {server}\nclient_secret: {secret}\ntls: {tls}\n");
    if let Some(uuid) = uuid {
        text.push_str("uuid: ");
        text.push_str(uuid);
        text.push('\n');
    }
    text
}

/// Reconcile a requested configuration against the persisted file contents.
///
/// `persisted` is `None` when no configuration file exists. A forced uuid
/// in `requested` always wins; otherwise the old uuid survives only when
/// server, secret and TLS all match.
#[must_use]
pub fn reconcile(requested: &AgentConfig, persisted: Option<&str>) -> ReconciledConfig {
    let (outcome, uuid) = if let Some(forced) = requested.uuid.as_deref() {
        (Reconciliation::Forced, Some(forced.to_string()))
    } else {
        match persisted.and_then(PersistedAgentConfig::parse) {
            Some(old) if old.matches(requested) => (Reconciliation::Stable, Some(old.uuid)),
            _ => (Reconciliation::Reset, None),
        }
    };

    let text = render_agent_config(
        &requested.server,
        &requested.secret,
        requested.tls,
        uuid.as_deref(),
    );
    ReconciledConfig {
        outcome,
        uuid,
        text,
    }
}
