use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use otaup_core::{is_mcu_archive_name, CancelFlag};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::ExtractError;

/// Unpacks `archive_path` into `dest_dir`, streaming one entry at a time.
///
/// MCU archives (matched by file name) wrap their content one directory
/// deeper than it should live, so their first path segment is stripped.
/// Entries that would resolve outside `dest_dir` are skipped, logged, and
/// processing continues. Progress is cumulative compressed bytes over the
/// archive file size, clamped to 0..=100 and reported only on change.
///
/// On any mid-stream failure or cancellation the partially extracted
/// `dest_dir` is deleted before returning.
pub fn extract(
    archive_path: &Path,
    dest_dir: &Path,
    on_progress: &mut dyn FnMut(u8),
    cancel: &CancelFlag,
) -> Result<(), ExtractError> {
    let total_size = match fs::metadata(archive_path) {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => metadata.len(),
        Ok(_) => {
            return Err(ExtractError::InvalidArchive(format!(
                "not a regular non-empty file: {}",
                archive_path.display()
            )));
        }
        Err(err) => {
            return Err(ExtractError::InvalidArchive(format!(
                "cannot stat {}: {err}",
                archive_path.display()
            )));
        }
    };

    let file = fs::File::open(archive_path).map_err(ExtractError::Io)?;
    let mut archive = ZipArchive::new(file).map_err(|err| invalid_or_io(archive_path, err))?;

    let strip_first_segment = archive_path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(is_mcu_archive_name);
    debug!(
        archive = %archive_path.display(),
        entries = archive.len(),
        strip_first_segment,
        "extracting archive"
    );

    fs::create_dir_all(dest_dir).map_err(ExtractError::Io)?;

    match extract_entries(
        &mut archive,
        dest_dir,
        total_size,
        strip_first_segment,
        on_progress,
        cancel,
    ) {
        Ok(()) => Ok(()),
        Err(err) => {
            // Leave no partial state behind.
            let _ = fs::remove_dir_all(dest_dir);
            Err(err)
        }
    }
}

fn extract_entries(
    archive: &mut ZipArchive<fs::File>,
    dest_dir: &Path,
    total_size: u64,
    strip_first_segment: bool,
    on_progress: &mut dyn FnMut(u8),
    cancel: &CancelFlag,
) -> Result<(), ExtractError> {
    let mut consumed: u64 = 0;
    let mut last_progress: i16 = -1;

    for index in 0..archive.len() {
        if cancel.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }

        let mut entry = archive
            .by_index(index)
            .map_err(|err| invalid_or_io(dest_dir, err))?;
        let compressed = entry.compressed_size();

        let mut name = entry.name().to_string();
        if strip_first_segment {
            match name.split_once('/') {
                Some((_, rest)) if !rest.is_empty() => name = rest.to_string(),
                Some(_) => continue, // the synthetic top-level directory itself
                None => {}
            }
        }

        let Some(relative) = sanitize_entry_path(&name) else {
            warn!(entry = %name, "skipping entry outside destination directory");
            continue;
        };
        let out_path = dest_dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
        }

        consumed += compressed;
        if total_size > 0 && compressed > 0 {
            let progress = ((consumed * 100) / total_size).min(100) as i16;
            if progress != last_progress {
                last_progress = progress;
                on_progress(progress as u8);
            }
        }
    }

    if last_progress < 100 {
        on_progress(100);
    }
    Ok(())
}

/// Entry names are only trusted as relative paths strictly inside the
/// destination; anything absolute or parent-escaping is rejected.
fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn invalid_or_io(path: &Path, err: ZipError) -> ExtractError {
    match err {
        ZipError::Io(io_err) => ExtractError::Io(io_err),
        other => ExtractError::InvalidArchive(format!("{}: {other}", path.display())),
    }
}
