//! `msync sync` – fetch the manifest and fill in missing files.

use anyhow::{bail, Context, Result};
use msync_core::client::RedirectFollowingClient;
use msync_core::config::MsyncConfig;
use msync_core::region::{Region, SyncTarget};
use msync_core::sync::{self, SyncPlan, SyncReport};
use std::path::PathBuf;

/// Per-run overrides from the command line.
#[derive(Debug, Default)]
pub struct SyncArgs {
    pub region: Option<Region>,
    pub manifest_url: Option<String>,
    pub base_url: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub max_redirects: Option<u32>,
    pub json: bool,
}

fn print_report(report: &SyncReport) {
    println!(
        "Downloaded {}, skipped {}, failed {} ({} bytes)",
        report.downloaded(),
        report.skipped(),
        report.failed(),
        report.bytes_downloaded()
    );
    for (entry, err) in report.failures() {
        println!("  FAILED {}: {}", entry, err);
    }
}

pub fn run_sync(cfg: &MsyncConfig, args: SyncArgs) -> Result<()> {
    let region = match args.region.or(cfg.region) {
        Some(r) => r,
        None => bail!("no region given; pass --region or set `region` in config.toml"),
    };
    let storage_root = args.storage_root.unwrap_or_else(|| cfg.storage_root.clone());
    let manifest_url = args.manifest_url.unwrap_or_else(|| cfg.manifest_url.clone());
    let base_url = args.base_url.unwrap_or_else(|| cfg.base_url.clone());

    let mut opts = cfg.client_options();
    if let Some(n) = args.max_redirects {
        opts.max_redirects = Some(n);
    }
    let client = RedirectFollowingClient::new(opts);

    let target = SyncTarget::for_region(&storage_root, region);
    let plan = SyncPlan::new(manifest_url, base_url, &storage_root, target);
    let report = sync::run(&client, &plan)
        .with_context(|| format!("sync aborted: manifest {}", plan.manifest_url))?;

    if args.json {
        println!("{}", report.summary().to_json_pretty()?);
    } else {
        print_report(&report);
    }
    if !report.is_success() {
        bail!("{} of {} entries failed", report.failed(), report.entries().len());
    }
    Ok(())
}
