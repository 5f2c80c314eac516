//! SHA-256 digest of a local file, for eyeballing a synced resource.
//!
//! Not used on the sync path; nothing here compares against an expected value.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Byte count and lowercase hex SHA-256 of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub bytes: u64,
    pub sha256: String,
}

/// Stream `path` through SHA-256.
pub fn digest_file(path: &Path) -> Result<FileDigest> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let bytes = io::copy(&mut BufReader::new(f), &mut hasher)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(FileDigest {
        bytes,
        sha256: hex::encode(hasher.finalize()),
    })
}
