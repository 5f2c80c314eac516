//! Local file lifecycle for synced resources.
//!
//! Writes are direct: the destination is opened, the whole body written in one
//! pass, and closed. There is no temp-file staging, so a failure mid-write can
//! leave a truncated file behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Fallback scratch name when the manifest URL has no usable last segment.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.txt";

/// Create `dir` (and parents) if absent.
pub fn ensure_dir(dir: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), SyncError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Write `bytes` to `path`, replacing any previous content.
pub fn persist(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    let mut file = File::create(path).map_err(|e| SyncError::io(path, e))?;
    file.write_all(bytes).map_err(|e| SyncError::io(path, e))?;
    file.flush().map_err(|e| SyncError::io(path, e))?;
    Ok(())
}

/// Local path for a manifest entry under `base_dir`.
pub fn local_path(base_dir: &Path, entry: &str) -> PathBuf {
    base_dir.join(entry)
}

/// Scratch location for a fetched manifest: the last URL path segment under
/// `root`, or `manifest.txt` when the URL has none.
pub fn manifest_scratch_path(root: &Path, manifest_url: &str) -> PathBuf {
    let name = url::Url::parse(manifest_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segs| segs.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty() && s != "." && s != "..");
    root.join(name.as_deref().unwrap_or(DEFAULT_MANIFEST_NAME))
}
