//! Manifest-driven synchronization.
//!
//! Entries already present on disk are skipped without comparing content;
//! missing ones are downloaded one after another. A failed entry is recorded
//! and the loop moves on. Only a manifest fetch failure aborts the run.

mod report;

pub use report::{EntryOutcome, EntryReport, FailureSummary, ReportSummary, SyncReport};

use std::path::{Path, PathBuf};

use crate::client::RedirectFollowingClient;
use crate::downloader;
use crate::error::SyncError;
use crate::manifest::{Manifest, ManifestSource};
use crate::region::SyncTarget;
use crate::storage;

/// Base URL that manifest entries are resolved against.
#[derive(Debug, Clone)]
pub struct RemoteRoot {
    base: url::Url,
}

impl RemoteRoot {
    /// Parse `base_url`, treating it as a directory even without a trailing `/`.
    pub fn parse(base_url: &str) -> Result<Self, SyncError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = url::Url::parse(&normalized).map_err(|e| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }
        Ok(Self { base })
    }

    /// `base/entry`, percent-encoding as needed.
    pub fn join(&self, entry: &str) -> Result<String, SyncError> {
        self.base
            .join(entry)
            .map(String::from)
            .map_err(|e| SyncError::InvalidUrl {
                url: format!("{}{}", self.base, entry),
                reason: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }
}

/// Diffs a manifest against local storage and downloads what is missing.
pub struct SyncExecutor<'a> {
    client: &'a RedirectFollowingClient,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(client: &'a RedirectFollowingClient) -> Self {
        Self { client }
    }

    fn sync_entry(&self, local: &Path, remote: &RemoteRoot, entry: &str) -> Result<u64, SyncError> {
        let url = remote.join(entry)?;
        storage::ensure_parent_dir(local)?;
        downloader::fetch_to_path(self.client, &url, local)
    }

    /// Process every entry in manifest order.
    pub fn sync(&self, manifest: &Manifest, base_dir: &Path, remote: &RemoteRoot) -> SyncReport {
        let mut report = SyncReport::default();
        for entry in manifest.iter() {
            let local = storage::local_path(base_dir, entry);
            if local.exists() {
                tracing::debug!("skip {}: present at {}", entry, local.display());
                report.record(entry, EntryOutcome::Skipped);
                continue;
            }
            match self.sync_entry(&local, remote, entry) {
                Ok(bytes) => {
                    tracing::info!("downloaded {} ({} bytes)", entry, bytes);
                    report.record(entry, EntryOutcome::Downloaded { bytes });
                }
                Err(e) => {
                    tracing::warn!("failed {}: {}", entry, e);
                    report.record(entry, EntryOutcome::Failed(e));
                }
            }
        }
        tracing::info!(
            skipped = report.skipped(),
            downloaded = report.downloaded(),
            failed = report.failed(),
            "sync finished"
        );
        report
    }
}

/// Everything one sync run needs.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub manifest_url: String,
    pub base_url: String,
    pub target: SyncTarget,
    /// Where the fetched manifest is kept before parsing.
    pub manifest_scratch: PathBuf,
}

impl SyncPlan {
    /// Plan with the manifest scratch file placed under `storage_root`.
    pub fn new(
        manifest_url: impl Into<String>,
        base_url: impl Into<String>,
        storage_root: &Path,
        target: SyncTarget,
    ) -> Self {
        let manifest_url = manifest_url.into();
        let manifest_scratch = storage::manifest_scratch_path(storage_root, &manifest_url);
        Self {
            manifest_url,
            base_url: base_url.into(),
            target,
            manifest_scratch,
        }
    }
}

/// Fetch the manifest and sync it into the plan's target directory.
pub fn run(client: &RedirectFollowingClient, plan: &SyncPlan) -> Result<SyncReport, SyncError> {
    let remote = RemoteRoot::parse(&plan.base_url)?;
    let base_dir = plan.target.base_dir();
    tracing::info!(
        "sync region {} into {} from {}",
        plan.target.region(),
        base_dir.display(),
        remote.as_str()
    );
    let manifest = ManifestSource::new(client).fetch(&plan.manifest_url, &plan.manifest_scratch)?;
    storage::ensure_dir(base_dir)?;
    Ok(SyncExecutor::new(client).sync(&manifest, base_dir, &remote))
}
