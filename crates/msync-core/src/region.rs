//! Region → title ID table and the local directory it selects.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Console region of the installed title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Usa,
    Europe,
    Japan,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Usa, Region::Europe, Region::Japan];

    /// 16-digit hex title ID of the game for this region.
    pub fn title_id(self) -> &'static str {
        match self {
            Region::Usa => "00040000001B8700",
            Region::Europe => "000400000017CA00",
            Region::Japan => "000400000017FD00",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Usa => "usa",
            Region::Europe => "europe",
            Region::Japan => "japan",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown region {0:?} (expected usa, europe or japan)")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usa" | "us" => Ok(Region::Usa),
            "europe" | "eur" | "eu" => Ok(Region::Europe),
            "japan" | "jpn" | "jp" => Ok(Region::Japan),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

/// Local directory that mirrors the manifest for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    region: Region,
    base_dir: PathBuf,
}

impl SyncTarget {
    /// `storage_root/luma/titles/<TITLE_ID>`.
    pub fn for_region(storage_root: &Path, region: Region) -> Self {
        Self {
            region,
            base_dir: storage_root
                .join("luma")
                .join("titles")
                .join(region.title_id()),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
