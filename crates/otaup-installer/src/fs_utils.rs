use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

const DELETE_RETRIES: u32 = 3;
const DELETE_BACKOFF: Duration = Duration::from_millis(200);

/// Deletes a file or directory tree, retrying on failure to ride out
/// transient file locks held by concurrent readers. Missing paths are a
/// no-op, so cleanup stays idempotent.
pub fn remove_with_retry(path: &Path) -> io::Result<()> {
    let mut attempt = 0;
    loop {
        match remove_any(path) {
            Ok(()) => {
                if attempt > 0 {
                    debug!(path = %path.display(), attempt, "deleted on retry");
                }
                return Ok(());
            }
            Err(err) if attempt < DELETE_RETRIES => {
                attempt += 1;
                warn!(path = %path.display(), attempt, %err, "delete failed, retrying");
                thread::sleep(DELETE_BACKOFF);
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "delete failed after retries");
                return Err(err);
            }
        }
    }
}

fn remove_any(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Recursive directory copy. Directory moves across the staging boundary
/// are always copy-then-delete, never rename, because the target root may
/// live on a different storage volume.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let metadata = fs::symlink_metadata(&src_path)?;
        if metadata.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
            continue;
        }

        #[cfg(unix)]
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&src_path)?;
            std::os::unix::fs::symlink(&target, &dst_path)?;
            continue;
        }

        fs::copy(&src_path, &dst_path)?;
    }
    Ok(())
}

/// Moves a single file: rename when source and destination share a volume,
/// copy+delete otherwise.
pub fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    fs::copy(src, dst)?;
    fs::remove_file(src)
}

/// All regular files under `dir`, at any depth.
pub(crate) fn collect_files_recursive(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(dir, &mut files)?;
    Ok(files)
}

fn collect_into(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_into(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Top-level entries of a directory, sorted by name for deterministic
/// placement order.
pub(crate) fn sorted_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}
