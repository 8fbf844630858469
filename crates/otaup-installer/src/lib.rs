mod classify;
mod error;
mod extract;
mod fs_utils;
mod layout;
mod reboot;
mod relocate;
mod verify;

pub use classify::{classify, is_marker_dir_name, MARKER_DIRS};
pub use error::{ExtractError, RebootError, RelocateError, VerifyError};
pub use extract::extract;
pub use fs_utils::{copy_dir_recursive, move_file, remove_with_retry};
pub use layout::UpdateLayout;
pub use reboot::{RebootTrigger, RecoveryReboot};
pub use relocate::{relocate, RelocateReport};
pub use verify::{sha256_hex, verify_archive};
