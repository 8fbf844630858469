use thiserror::Error;

/// Failure categories for listing and probing the remote catalog. All of
/// these are recoverable by a retry at the control-surface level.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("object store credentials rejected")]
    CredentialsInvalid,
    #[error("network error while reading catalog: {0}")]
    Network(String),
    #[error("catalog location not found: {0}")]
    NotFound(String),
    #[error("catalog error: {0}")]
    Other(String),
}

/// Failure categories for object downloads. `Cancelled` is a normal
/// terminal outcome, not a user-visible failure.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error during download: {0}")]
    Network(String),
    #[error("download cancelled")]
    Cancelled,
    #[error("i/o error during download")]
    Io(#[from] std::io::Error),
}
