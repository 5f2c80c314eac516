//! CLI for msync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use msync_core::config;
use msync_core::region::Region;
use std::path::PathBuf;

use commands::{run_digest, run_fetch, run_regions, run_sync, SyncArgs};

/// Top-level CLI for msync.
#[derive(Debug, Parser)]
#[command(name = "msync")]
#[command(about = "msync: keep a local title directory in sync with a remote manifest", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the manifest and download every entry missing locally.
    Sync {
        /// Region whose title directory is synced (usa, europe, japan).
        #[arg(long)]
        region: Option<Region>,
        /// Manifest URL (overrides config).
        #[arg(long, value_name = "URL")]
        manifest_url: Option<String>,
        /// Base URL that entries are resolved against (overrides config).
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Mounted storage root (overrides config).
        #[arg(long, value_name = "DIR")]
        storage_root: Option<PathBuf>,
        /// Maximum redirect hops per request (overrides config).
        #[arg(long, value_name = "N")]
        max_redirects: Option<u32>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Download a single URL to a file.
    Fetch {
        /// HTTP/HTTPS URL to download.
        url: String,
        /// Destination file.
        dest: PathBuf,
    },

    /// List regions, their title IDs and target directories.
    Regions,

    /// Compute SHA-256 of a file.
    Digest {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync {
                region,
                manifest_url,
                base_url,
                storage_root,
                max_redirects,
                json,
            } => run_sync(
                &cfg,
                SyncArgs {
                    region,
                    manifest_url,
                    base_url,
                    storage_root,
                    max_redirects,
                    json,
                },
            )?,
            CliCommand::Fetch { url, dest } => run_fetch(&cfg, &url, &dest)?,
            CliCommand::Regions => run_regions(&cfg),
            CliCommand::Digest { path } => run_digest(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
