//! Filesystem infrastructure: the production host and its `LocalFs` impl.
//!
//! `LocalHost` implements every port a supervisor needs; the download,
//! archive and process impls live in their own modules.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;

/// The machine the bootstrap runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHost {
    /// Draw download progress bars on stderr.
    pub show_progress: bool,
}

impl LocalHost {
    #[must_use]
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }
}

impl LocalFs for LocalHost {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading file {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("writing file {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    fn set_executable(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        #[cfg(not(unix))]
        if !path.exists() {
            anyhow::bail!("{} does not exist", path.display());
        }
        Ok(())
    }
}
