//! Newline-delimited manifest of relative resource paths.
//!
//! Each line, minus its terminator, is one entry. Blank lines are skipped.
//! There is no escaping or comment syntax. Entries that would land outside the
//! base directory are refused.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path};

use crate::client::RedirectFollowingClient;
use crate::downloader;
use crate::error::SyncError;
use crate::storage;

/// Ordered list of relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<String>,
}

fn check_entry(line_no: usize, entry: &str) -> Result<(), SyncError> {
    let reject = |reason: &str| SyncError::ManifestParse {
        line: line_no,
        reason: format!("{}: {:?}", reason, entry),
    };
    if entry.contains('\0') {
        return Err(reject("NUL byte in path"));
    }
    if entry.starts_with('/') || entry.starts_with('\\') {
        return Err(reject("absolute path"));
    }
    let mut named = false;
    for comp in Path::new(entry).components() {
        match comp {
            Component::ParentDir => return Err(reject("parent directory component")),
            Component::RootDir | Component::Prefix(_) => return Err(reject("absolute path")),
            Component::CurDir => {}
            Component::Normal(_) => named = true,
        }
    }
    // `.`, `./` and the like would name the base directory itself.
    if !named {
        return Err(reject("entry names no file"));
    }
    Ok(())
}

impl Manifest {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse manifest text. Line numbers in errors are 1-based.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            // `lines` strips `\n` and `\r\n`.
            if line.trim().is_empty() {
                continue;
            }
            check_entry(idx + 1, line)?;
            entries.push(line.to_string());
        }
        Ok(Self { entries })
    }

    /// Parse a manifest previously written to `path`.
    pub fn read_from(path: &Path) -> Result<Self, SyncError> {
        let file = File::open(path).map_err(|e| SyncError::io(path, e))?;
        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                if e.kind() == std::io::ErrorKind::InvalidData {
                    SyncError::ManifestParse {
                        line: idx + 1,
                        reason: "not valid UTF-8".to_string(),
                    }
                } else {
                    SyncError::io(path, e)
                }
            })?;
            if line.trim().is_empty() {
                continue;
            }
            check_entry(idx + 1, &line)?;
            entries.push(line);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Fetches a manifest over HTTP, keeping a copy at a scratch path.
pub struct ManifestSource<'a> {
    client: &'a RedirectFollowingClient,
}

impl<'a> ManifestSource<'a> {
    pub fn new(client: &'a RedirectFollowingClient) -> Self {
        Self { client }
    }

    /// Download `manifest_url` to `scratch`, then parse it.
    pub fn fetch(&self, manifest_url: &str, scratch: &Path) -> Result<Manifest, SyncError> {
        storage::ensure_parent_dir(scratch)?;
        let bytes = downloader::fetch_to_path(self.client, manifest_url, scratch)?;
        let manifest = Manifest::read_from(scratch)?;
        tracing::info!(
            "manifest {}: {} entries ({} bytes)",
            manifest_url,
            manifest.len(),
            bytes
        );
        Ok(manifest)
    }
}
