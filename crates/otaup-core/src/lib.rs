mod cancel;
mod candidate;
mod device;
mod naming;
mod shape;

pub use cancel::CancelFlag;
pub use candidate::{parse_version_date, update_available, UpdateCandidate};
pub use device::{CpuModel, DeviceFingerprint, DeviceProbe, McuTag, StaticProbe, UNKNOWN};
pub use naming::{
    file_name_of_key, is_mcu_archive_name, is_mcu_dir_name, is_numeric_prefixed_zip,
    parse_app_object_name, parse_system_object_name, APP_PREFIX, MCU_PREFIX, SYSTEM_PREFIX,
};
pub use shape::PackageShape;

#[cfg(test)]
mod tests;
