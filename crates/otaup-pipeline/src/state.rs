/// Lifecycle of one update attempt. The machine is owned by the pipeline
/// and only ever advanced by it; callers observe transitions through
/// events.
///
/// `Failed` and `Cancelled` are resting states: a new attempt may be
/// started from them (and from `Idle`). `AwaitingReboot` is terminal until
/// the reboot happens; starting from it is rejected so a second update
/// cannot layer over one that has not booted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Checking,
    Downloading,
    Extracting,
    Relocating,
    AwaitingReboot,
    Failed,
    Cancelled,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Downloading => "downloading",
            Self::Extracting => "extracting",
            Self::Relocating => "relocating",
            Self::AwaitingReboot => "awaiting-reboot",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// True while a worker is actively driving the attempt forward.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Checking | Self::Downloading | Self::Extracting | Self::Relocating
        )
    }
}
