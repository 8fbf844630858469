use std::fs;
use std::io;
use std::path::Path;

use otaup_core::PackageShape;
use tracing::{debug, info, warn};

use crate::classify::is_marker_dir_name;
use crate::fs_utils::{
    collect_files_recursive, copy_dir_recursive, move_file, remove_with_retry, sorted_entries,
};
use crate::RelocateError;

/// Outcome of a successful relocation. Soft failures are secondary entries
/// that could not be placed; the update as a whole still applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelocateReport {
    pub soft_failures: Vec<String>,
}

impl RelocateReport {
    pub fn is_clean(&self) -> bool {
        self.soft_failures.is_empty()
    }
}

/// Moves staged content into the live target root according to the rules
/// for its package shape.
///
/// Staging is deleted by the shape handlers on their success paths only;
/// on failure it is left intact for diagnostics and the caller's cleanup.
pub fn relocate(
    staging_dir: &Path,
    target_root: &Path,
    shape: PackageShape,
) -> Result<RelocateReport, RelocateError> {
    info!(
        staging = %staging_dir.display(),
        target = %target_root.display(),
        shape = shape.as_str(),
        "relocating staged update"
    );
    fs::create_dir_all(target_root).map_err(RelocateError::Io)?;

    match shape {
        PackageShape::SystemImage => {
            relocate_system_image_with_ops(staging_dir, target_root, &mut copy_entry)
        }
        PackageShape::McuFirmware => relocate_mcu_firmware(staging_dir, target_root),
        PackageShape::SystemAppBundle => relocate_app_bundle(staging_dir, target_root),
        PackageShape::Unrecognized => Err(RelocateError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unrecognized staging layout: {}", staging_dir.display()),
        ))),
    }
}

fn copy_entry(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

/// System images preserve the full directory structure. Marker directories
/// are critical: the first marker that fails aborts the whole operation
/// before any further entry is attempted. Non-marker failures are recorded
/// as soft failures and placement continues.
///
/// The copy operation is injected so failure handling can be exercised in
/// tests.
pub(crate) fn relocate_system_image_with_ops(
    staging_dir: &Path,
    target_root: &Path,
    copy_op: &mut dyn FnMut(&Path, &Path) -> io::Result<()>,
) -> Result<RelocateReport, RelocateError> {
    let mut report = RelocateReport::default();

    for entry in sorted_entries(staging_dir).map_err(RelocateError::Io)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let source = entry.path();
        let target = target_root.join(&name);
        let critical = source.is_dir() && is_marker_dir_name(&name);

        if let Err(err) = remove_with_retry(&target) {
            if critical {
                warn!(entry = %name, %err, "failed to clear critical directory, aborting");
                return Err(RelocateError::CriticalPathFailed(name));
            }
            warn!(entry = %name, %err, "failed to clear existing entry");
            report.soft_failures.push(name);
            continue;
        }

        if let Err(err) = copy_op(&source, &target) {
            if critical {
                warn!(entry = %name, %err, "failed to place critical directory, aborting");
                return Err(RelocateError::CriticalPathFailed(name));
            }
            warn!(entry = %name, %err, "failed to place entry");
            report.soft_failures.push(name);
            continue;
        }
        debug!(entry = %name, "placed");
    }

    // All critical paths succeeded; staging has served its purpose.
    if let Err(err) = remove_with_retry(staging_dir) {
        warn!(staging = %staging_dir.display(), %err, "failed to delete staging directory");
    }
    Ok(report)
}

/// MCU firmware is flattened: every file at any depth lands directly in the
/// target root; subdirectory structure is discarded.
fn relocate_mcu_firmware(
    staging_dir: &Path,
    target_root: &Path,
) -> Result<RelocateReport, RelocateError> {
    let mut report = RelocateReport::default();

    let mut files = collect_files_recursive(staging_dir).map_err(RelocateError::Io)?;
    files.sort();
    for source in files {
        let Some(name) = source.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let target = target_root.join(&name);
        if let Err(err) = remove_with_retry(&target) {
            warn!(file = %name, %err, "failed to clear existing file");
            report.soft_failures.push(name);
            continue;
        }
        if let Err(err) = move_file(&source, &target) {
            warn!(file = %name, %err, "failed to move file");
            report.soft_failures.push(name);
        }
    }

    if report.is_clean() {
        if let Err(err) = remove_with_retry(staging_dir) {
            warn!(staging = %staging_dir.display(), %err, "failed to delete staging directory");
        } else {
            delete_redundant_mcu_parent(staging_dir);
        }
    }
    Ok(report)
}

// Some MCU archives introduce a redundant nesting level: the staging
// directory's parent carries the same MCU-pattern name. Remove it too.
fn delete_redundant_mcu_parent(staging_dir: &Path) {
    let Some(parent) = staging_dir.parent() else {
        return;
    };
    if parent.file_name() == staging_dir.file_name() {
        if let Err(err) = remove_with_retry(parent) {
            warn!(parent = %parent.display(), %err, "failed to delete redundant MCU parent");
        }
    }
}

/// App bundles merge one level deep: top-level files are copied directly,
/// top-level directories are copied recursively as whole units.
fn relocate_app_bundle(
    staging_dir: &Path,
    target_root: &Path,
) -> Result<RelocateReport, RelocateError> {
    let mut report = RelocateReport::default();

    for entry in sorted_entries(staging_dir).map_err(RelocateError::Io)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let source = entry.path();
        let target = target_root.join(&name);

        if let Err(err) = remove_with_retry(&target) {
            warn!(entry = %name, %err, "failed to clear existing entry");
            report.soft_failures.push(name);
            continue;
        }
        if let Err(err) = copy_entry(&source, &target) {
            warn!(entry = %name, %err, "failed to place entry");
            report.soft_failures.push(name);
        }
    }

    if report.is_clean() {
        if let Err(err) = remove_with_retry(staging_dir) {
            warn!(staging = %staging_dir.display(), %err, "failed to delete staging directory");
        }
    }
    Ok(report)
}
