use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use otaup_core::CancelFlag;
use tracing::{debug, warn};

use crate::{CatalogError, DownloadError, ObjectSummary, PackageStore};

const CHUNK_SIZE: usize = 8192;

/// Package store backed by a local directory mirroring the bucket tree.
/// Used for USB-media updates and as the test double for the remote store.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collect_objects(
        &self,
        dir: &Path,
        prefix: &str,
        out: &mut Vec<ObjectSummary>,
    ) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                self.collect_objects(&path, &format!("{prefix}{name}/"), out)?;
            } else {
                let size = entry.metadata()?.len();
                out.push(ObjectSummary {
                    key: format!("{prefix}{name}"),
                    size,
                    sha256: None,
                });
            }
        }
        Ok(())
    }
}

impl PackageStore for DirStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, CatalogError> {
        let base = self.root.join(prefix.trim_end_matches('/'));
        if !base.is_dir() {
            debug!(prefix, "no such catalog folder in mirror");
            return Ok(Vec::new());
        }
        let normalized = if prefix.ends_with('/') || prefix.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        let mut objects = Vec::new();
        self.collect_objects(&base, &normalized, &mut objects)
            .map_err(|err| CatalogError::Other(format!("failed to scan mirror: {err}")))?;
        Ok(objects)
    }

    fn download(
        &self,
        key: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(u64, u64),
        cancel: &CancelFlag,
    ) -> Result<(), DownloadError> {
        let source = self.root.join(key);
        let total = fs::metadata(&source)?.len();
        let mut reader = fs::File::open(&source)?;

        let result = copy_with_progress(&mut reader, dest, total, on_progress, cancel);
        if result.is_err() {
            if let Err(err) = fs::remove_file(dest) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %dest.display(), %err, "failed to remove partial download");
                }
            }
        }
        result
    }
}

/// Streams `reader` into a fresh file at `dest`, reporting progress per
/// chunk and honoring the cancel flag between chunks.
pub(crate) fn copy_with_progress(
    reader: &mut dyn Read,
    dest: &Path,
    total: u64,
    on_progress: &mut dyn FnMut(u64, u64),
    cancel: &CancelFlag,
) -> Result<(), DownloadError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(dest)?;
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut transferred: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])?;
        transferred += read as u64;
        on_progress(transferred, total);
    }
    out.flush()?;
    Ok(())
}
