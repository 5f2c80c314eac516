//! `msync regions` – show the region table.

use msync_core::config::MsyncConfig;
use msync_core::region::{Region, SyncTarget};

pub fn run_regions(cfg: &MsyncConfig) {
    println!("{:<8} {:<18} TARGET", "REGION", "TITLE ID");
    for region in Region::ALL {
        let target = SyncTarget::for_region(&cfg.storage_root, region);
        let marker = if cfg.region == Some(region) { " (default)" } else { "" };
        println!(
            "{:<8} {:<18} {}{}",
            region,
            region.title_id(),
            target.base_dir().display(),
            marker
        );
    }
}
