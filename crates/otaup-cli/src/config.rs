use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use otaup_core::{CpuModel, StaticProbe, UNKNOWN};
use otaup_installer::UpdateLayout;
use otaup_store::{DirStore, HttpStore, PackageStore};
use serde::Deserialize;

/// Host configuration, loaded from a TOML file. Device values the host
/// cannot detect default to the `Unknown` sentinel, which makes every
/// catalog version look newer.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case", tag = "kind")]
pub enum StoreConfig {
    /// Remote object store serving the update bucket.
    Http {
        endpoint: String,
        bucket: String,
        access_key: Option<String>,
    },
    /// Local directory mirroring the bucket tree, e.g. USB media.
    Dir { root: PathBuf },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    #[serde(default = "unknown")]
    pub cpu_model: String,
    #[serde(default = "unknown")]
    pub resolution: String,
    #[serde(default = "unknown")]
    pub system_build_date: String,
    #[serde(default = "unknown")]
    pub app_build_timestamp: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cpu_model: unknown(),
            resolution: unknown(),
            system_build_date: unknown(),
            app_build_timestamp: unknown(),
        }
    }
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Private directory for downloads and staging.
    pub work_root: PathBuf,
    /// Live root the applied update is placed into.
    pub target_root: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn open_store(&self) -> Result<Arc<dyn PackageStore>> {
        match &self.store {
            StoreConfig::Http {
                endpoint,
                bucket,
                access_key,
            } => {
                let store = HttpStore::new(endpoint.clone(), bucket.clone())
                    .context("failed to open the remote package store")?
                    .with_access_key(access_key.clone());
                Ok(Arc::new(store))
            }
            StoreConfig::Dir { root } => Ok(Arc::new(DirStore::new(root))),
        }
    }

    pub fn probe(&self) -> StaticProbe {
        StaticProbe {
            cpu: CpuModel::parse(&self.device.cpu_model),
            resolution: self.device.resolution.clone(),
            system_build_date: self.device.system_build_date.clone(),
            app_build_timestamp: self.device.app_build_timestamp.clone(),
        }
    }

    pub fn layout(&self) -> UpdateLayout {
        UpdateLayout::new(&self.paths.work_root, &self.paths.target_root)
    }
}
