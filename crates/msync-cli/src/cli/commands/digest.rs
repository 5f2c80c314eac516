//! `msync digest <path>` – print SHA-256 of a file.

use anyhow::Result;
use msync_core::checksum;
use std::path::Path;

pub fn run_digest(path: &Path) -> Result<()> {
    let d = checksum::digest_file(path)?;
    println!("{}  {}  ({} bytes)", d.sha256, path.display(), d.bytes);
    Ok(())
}
