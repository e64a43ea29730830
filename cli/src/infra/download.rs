//! HTTP download of agent releases and the workload script.
//!
//! Blocking `ureq` on `spawn_blocking`, streamed to `<dest>.partial` and
//! renamed into place only once the body has been read completely.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::Downloader;
use crate::infra::fs::LocalHost;

const USER_AGENT: &str = concat!("bootwarden/", env!("CARGO_PKG_VERSION"));

impl Downloader for LocalHost {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        let show_progress = self.show_progress;
        tracing::debug!(%url, dest = %dest.display(), "downloading");
        tokio::task::spawn_blocking(move || fetch_to_file(&url, &dest, show_progress))
            .await
            .context("download task panicked")?
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut s = dest.as_os_str().to_owned();
    s.push(".partial");
    PathBuf::from(s)
}

/// Download `url` into `dest`, leaving `dest` untouched on failure.
///
/// # Errors
///
/// Returns an error on any non-2xx status, transport failure or write error.
pub fn fetch_to_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let partial = partial_path(dest);
    let result = stream_to(url, &partial, show_progress);
    match result {
        Ok(()) => std::fs::rename(&partial, dest)
            .with_context(|| format!("finalizing {}", dest.display())),
        Err(e) => {
            std::fs::remove_file(&partial).ok();
            Err(e)
        }
    }
}

fn stream_to(url: &str, partial: &Path, show_progress: bool) -> Result<()> {
    let response = match ureq::get(url).set("User-Agent", USER_AGENT).call() {
        Ok(r) => r,
        Err(ureq::Error::Status(code, _)) => anyhow::bail!("HTTP {code}"),
        Err(e) => anyhow::bail!("network error: {e}"),
    };

    let total = response
        .header("Content-Length")
        .and_then(|v| v.parse::<u64>().ok());
    let pb = make_progress_bar(show_progress, total);

    let mut file =
        File::create(partial).with_context(|| format!("creating {}", partial.display()))?;
    let mut reader = response.into_reader();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).context("download interrupted")?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .with_context(|| format!("writing {}", partial.display()))?;
        pb.inc(n as u64);
    }
    pb.finish_and_clear();
    file.flush().context("flushing download")?;
    Ok(())
}

fn make_progress_bar(show: bool, total: Option<u64>) -> indicatif::ProgressBar {
    if !show {
        return indicatif::ProgressBar::hidden();
    }
    if let Some(t) = total {
        let pb = indicatif::ProgressBar::new(t);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("    {bar:40.cyan/dim} {percent}%  {bytes}/{total_bytes}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("━━─"),
        );
        pb
    } else {
        indicatif::ProgressBar::new_spinner()
    }
}
