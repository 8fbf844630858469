use std::io;

use thiserror::Error;

/// Archive extraction failures. The extractor deletes its own staging
/// output before returning any of these.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
    #[error("i/o error during extraction")]
    Io(#[from] io::Error),
    #[error("extraction cancelled")]
    Cancelled,
}

/// Relocation failures. `CriticalPathFailed` means the live target root may
/// hold a structurally incomplete system image and must be surfaced as a
/// blocking error.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("critical path failed: {0}")]
    CriticalPathFailed(String),
    #[error("i/o error during relocation")]
    Io(#[from] io::Error),
}

/// Reboot request failures; every variant ends in a manual-reboot prompt.
#[derive(Debug, Error)]
pub enum RebootError {
    #[error("reboot command failed to start: {0}")]
    CommandFailed(String),
    #[error("device still alive after reboot grace period")]
    StillAliveAfterGrace,
}

/// Downloaded-archive digest verification failures.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("archive digest mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },
    #[error("i/o error while hashing archive")]
    Io(#[from] io::Error),
}
