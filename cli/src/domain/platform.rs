//! Host architecture to agent release asset mapping.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::PlatformError;

/// Placeholder replaced by the architecture code in download URL templates.
pub const ARCH_PLACEHOLDER: &str = "{arch}";

/// Architectures the agent publishes builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentArch {
    Amd64,
    Arm64,
}

impl AgentArch {
    /// Map a Rust target architecture (`std::env::consts::ARCH`) to an asset.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] for anything other than
    /// `x86_64` and `aarch64`; there is no silent fallback.
    pub fn from_target(arch: &str) -> Result<Self, PlatformError> {
        match arch {
            "x86_64" => Ok(Self::Amd64),
            "aarch64" => Ok(Self::Arm64),
            other => Err(PlatformError::Unsupported(other.to_string())),
        }
    }

    /// Architecture code used in release asset names.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }

    /// Expand a download URL template for this architecture.
    #[must_use]
    pub fn download_url(self, template: &str) -> String {
        template.replace(ARCH_PLACEHOLDER, self.code())
    }
}

impl fmt::Display for AgentArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AgentArch {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Ok(Self::Amd64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            other => Err(PlatformError::Unsupported(other.to_string())),
        }
    }
}
