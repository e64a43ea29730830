//! Zip extraction of agent releases via `self_update`'s archive support.

use std::path::Path;

use anyhow::{Context, Result};
use self_update::{ArchiveKind, Extract};

use crate::application::ports::ArchiveExtractor;
use crate::infra::fs::LocalHost;

impl ArchiveExtractor for LocalHost {
    async fn extract_zip(&self, archive: &Path, into: &Path) -> Result<()> {
        let archive = archive.to_path_buf();
        let into = into.to_path_buf();
        tokio::task::spawn_blocking(move || {
            Extract::from_source(&archive)
                .archive(ArchiveKind::Zip)
                .extract_into(&into)
                .with_context(|| format!("unzipping {}", archive.display()))
        })
        .await
        .context("extract task panicked")?
    }
}
