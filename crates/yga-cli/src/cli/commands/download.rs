//! `yga download` – stream a file to disk or stdout.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use yga_core::GroupClient;

pub fn run_download(client: &mut GroupClient, url: &str, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        let mut out = std::io::stdout().lock();
        client.download_to(url, &mut out)?;
        return Ok(());
    };

    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match client.download_to(url, &mut file) {
        Ok(bytes) => {
            file.sync_all()?;
            tracing::info!(url, bytes, path = %path.display(), "download complete");
            eprintln!("{} bytes -> {}", bytes, path.display());
            Ok(())
        }
        Err(err) => {
            drop(file);
            if std::fs::remove_file(path).is_err() {
                tracing::warn!("could not remove partial file {}", path.display());
            }
            Err(err).with_context(|| format!("downloading {}", url))
        }
    }
}
