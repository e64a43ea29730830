//! Instruction parser for `NZ_*` agent install commands.
//!
//! Operators paste the one-line install command shown by the dashboard. The
//! parser pulls the four known tokens out of it regardless of order or of any
//! surrounding shell text.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::agent::AgentConfig;

pub static SERVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"NZ_SERVER=([A-Za-z0-9_.:-]+)").expect("valid regex")
});

pub static SECRET_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"NZ_CLIENT_SECRET=([A-Za-z0-9_-]+)").expect("valid regex")
});

/// Case-insensitive, key included; a `true`/`false` prefix is enough.
pub static TLS_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)NZ_TLS=(true|false)").expect("valid regex")
});

pub static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"NZ_UUID=([A-Za-z0-9_-]+)").expect("valid regex")
});

fn first_capture<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse an install instruction into an [`AgentConfig`].
///
/// Returns `None` unless both `NZ_SERVER=` and `NZ_CLIENT_SECRET=` carry a
/// value. `NZ_TLS=` is matched case-insensitively and reads a leading
/// `true` / `false`, defaulting to `false`; `NZ_UUID=` is optional.
#[must_use]
pub fn parse_instruction(input: &str) -> Option<AgentConfig> {
    let server = first_capture(&SERVER_RE, input)?;
    let secret = first_capture(&SECRET_RE, input)?;
    let tls = first_capture(&TLS_RE, input).is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let uuid = first_capture(&UUID_RE, input).map(str::to_string);

    Some(AgentConfig {
        server: server.to_string(),
        secret: secret.to_string(),
        tls,
        uuid,
    })
}
