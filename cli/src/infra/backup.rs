//! Infrastructure implementation of the `BackupStore` port.
//!
//! `JsonBackupStore` keeps the last console instruction as pretty JSON,
//! written atomically (temp file + rename) with owner-only permissions.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::BackupStore;
use crate::domain::BackupRecord;

pub struct JsonBackupStore {
    path: PathBuf,
}

impl JsonBackupStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BackupStore for JsonBackupStore {
    fn load(&self) -> Result<Option<BackupRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading backup file {}", self.path.display()))?;
        let record: BackupRecord = serde_json::from_str(&content)
            .with_context(|| format!("parsing backup file {}", self.path.display()))?;
        Ok(Some(record))
    }

    fn save(&self, record: &BackupRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(record).context("serializing backup")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing backup file {}", self.path.display()))?;
        Ok(())
    }
}
