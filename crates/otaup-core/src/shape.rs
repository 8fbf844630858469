/// Structural category of a staged package; drives the relocation rules.
/// Never persisted, recomputed from staging contents on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageShape {
    /// Full system image: directory structure is preserved and marker
    /// directories are mandatory.
    SystemImage,
    /// MCU firmware: files are flattened to the target root at any depth.
    McuFirmware,
    /// Flat app-update bundle: top-level entries are merged into the target
    /// root, directories as whole units.
    SystemAppBundle,
    /// Staging area could not be inspected.
    Unrecognized,
}

impl PackageShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemImage => "system-image",
            Self::McuFirmware => "mcu-firmware",
            Self::SystemAppBundle => "system-app-bundle",
            Self::Unrecognized => "unrecognized",
        }
    }
}
