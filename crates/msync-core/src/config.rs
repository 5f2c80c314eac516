use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{ClientOptions, DEFAULT_MAX_REDIRECTS};
use crate::region::Region;

/// Transport knobs (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Maximum redirect hops per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    /// Connect timeout in seconds; absent means the transport default.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_max_redirects() -> u32 {
    DEFAULT_MAX_REDIRECTS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            connect_timeout_secs: None,
        }
    }
}

/// Global configuration loaded from `~/.config/msync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsyncConfig {
    /// URL of the newline-delimited manifest.
    pub manifest_url: String,
    /// URL that manifest entries are resolved against.
    pub base_url: String,
    /// Mounted storage root; synced files land under `luma/titles/<TITLE_ID>`.
    pub storage_root: PathBuf,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Region used when none is given on the command line.
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/wyndchyme/mc3ds-modern/refs/heads/main/";

impl Default for MsyncConfig {
    fn default() -> Self {
        Self {
            manifest_url: format!("{}appConfiguration.info", DEFAULT_BASE_URL),
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_root: PathBuf::from("."),
            user_agent: ClientOptions::default().user_agent,
            region: None,
            http: None,
        }
    }
}

impl MsyncConfig {
    /// Client options derived from this config.
    pub fn client_options(&self) -> ClientOptions {
        let http = self.http.clone().unwrap_or_default();
        ClientOptions {
            user_agent: self.user_agent.clone(),
            max_redirects: Some(http.max_redirects),
            connect_timeout: http.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("msync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Read the config at `path`. A missing file is replaced by the defaults,
/// which are also written back so the user has something to edit.
pub fn load_from(path: &Path) -> Result<MsyncConfig> {
    match fs::read_to_string(path) {
        Ok(data) => {
            toml::from_str(&data).with_context(|| format!("parse {}", path.display()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let cfg = MsyncConfig::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, toml::to_string_pretty(&cfg)?)
                .with_context(|| format!("write {}", path.display()))?;
            tracing::info!("wrote default config to {}", path.display());
            Ok(cfg)
        }
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

/// Load `~/.config/msync/config.toml`, seeding it on first run.
pub fn load_or_init() -> Result<MsyncConfig> {
    load_from(&config_path()?)
}
