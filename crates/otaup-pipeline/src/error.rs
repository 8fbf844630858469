use otaup_installer::RebootError;
use otaup_store::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Another attempt is in flight; exactly one runs at a time.
    #[error("an update is already in progress (currently {0})")]
    Busy(&'static str),

    #[error("no applied update is awaiting a reboot (currently {0})")]
    NotAwaitingReboot(&'static str),

    #[error("no previous update attempt to resume")]
    NothingToResume,

    #[error("catalog scan failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("reboot request failed: {0}")]
    Reboot(#[from] RebootError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
