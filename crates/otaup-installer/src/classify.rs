use std::fs;
use std::path::Path;

use otaup_core::{is_mcu_dir_name, is_numeric_prefixed_zip, PackageShape};
use tracing::{debug, warn};

/// Vendor-reserved system-update directories. Their presence marks a full
/// system image, and placing them is mandatory for such an update to count
/// as applied.
pub const MARKER_DIRS: &[&str] = &["lsec_updatesh", "oem", "vaudioshow"];

pub fn is_marker_dir_name(name: &str) -> bool {
    MARKER_DIRS
        .iter()
        .any(|marker| name.eq_ignore_ascii_case(marker))
}

/// Classifies a staging directory into a package shape. First matching
/// rule wins; system-image signals are checked before the MCU name pattern
/// because a system image implies a superset layout and must take priority
/// in malformed archives carrying both.
pub fn classify(staging_dir: &Path) -> PackageShape {
    let entries = match fs::read_dir(staging_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(staging = %staging_dir.display(), %err, "cannot inspect staging directory");
            return PackageShape::Unrecognized;
        }
    };

    let mut has_numeric_zip = false;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() && is_marker_dir_name(&name) {
            debug!(marker = %name, "marker directory present, system image");
            return PackageShape::SystemImage;
        }
        if file_type.is_file() && is_numeric_prefixed_zip(&name) {
            has_numeric_zip = true;
        }
    }
    if has_numeric_zip {
        debug!("numeric-prefixed inner archive present, system image");
        return PackageShape::SystemImage;
    }

    let dir_name = staging_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if is_mcu_dir_name(&dir_name) {
        return PackageShape::McuFirmware;
    }

    // Everything else is a flat app-update bundle merged into the root.
    PackageShape::SystemAppBundle
}
