use std::path::Path;

use otaup_core::CancelFlag;
use serde::Deserialize;

use crate::{CatalogError, DownloadError};

/// One object in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Remote object catalog: list objects under a prefix and fetch an object's
/// bytes to a local path with progress reporting and cooperative
/// cancellation.
///
/// Implementations must check the cancel flag at least once per transfer
/// chunk, and must not leave a partial destination file behind on any error
/// path.
pub trait PackageStore: Send + Sync {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, CatalogError>;

    fn download(
        &self,
        key: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(u64, u64),
        cancel: &CancelFlag,
    ) -> Result<(), DownloadError>;
}
