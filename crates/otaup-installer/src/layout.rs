use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use otaup_core::file_name_of_key;

/// Path schema for one updater installation: a private work root holding
/// downloads and staging, and the live target root where applied updates
/// end up. Staging never overlaps the target root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLayout {
    work_root: PathBuf,
    target_root: PathBuf,
}

impl UpdateLayout {
    pub fn new(work_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
            target_root: target_root.into(),
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.work_root.join("downloads")
    }

    pub fn staging_root(&self) -> PathBuf {
        self.work_root.join("staging")
    }

    /// Local file the archive for `object_key` is downloaded to.
    pub fn download_path(&self, object_key: &str) -> PathBuf {
        self.downloads_dir().join(file_name_of_key(object_key))
    }

    /// Private staging directory for `object_key`, named after the archive
    /// stem so MCU packages keep their `L<digits>_MCU` directory name for
    /// classification.
    pub fn staging_dir(&self, object_key: &str) -> PathBuf {
        let name = file_name_of_key(object_key);
        let stem = name.strip_suffix(".zip").unwrap_or(name);
        self.staging_root().join(stem)
    }

    pub fn ensure_base_dirs(&self) -> io::Result<()> {
        for dir in [self.downloads_dir(), self.staging_root()] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
