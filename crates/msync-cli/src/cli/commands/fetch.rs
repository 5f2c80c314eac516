//! `msync fetch <url> <dest>` – download one resource.

use anyhow::{Context, Result};
use msync_core::client::RedirectFollowingClient;
use msync_core::config::MsyncConfig;
use msync_core::downloader;
use std::path::Path;

pub fn run_fetch(cfg: &MsyncConfig, url: &str, dest: &Path) -> Result<()> {
    let client = RedirectFollowingClient::new(cfg.client_options());
    let bytes = downloader::fetch_to_path(&client, url, dest)
        .with_context(|| format!("fetch {}", url))?;
    println!("Saved {} ({} bytes)", dest.display(), bytes);
    Ok(())
}
