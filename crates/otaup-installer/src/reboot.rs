use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::RebootError;

/// Issues the privileged reboot request. Any error means the operator must
/// be prompted to reboot manually; the request is never silently abandoned.
pub trait RebootTrigger: Send + Sync {
    fn trigger(&self) -> Result<(), RebootError>;
}

/// Reboots into recovery via the platform shell command, then waits out a
/// grace period. If the process is still alive afterwards the reboot did
/// not take and the caller must fall back to a manual prompt.
#[derive(Debug, Clone)]
pub struct RecoveryReboot {
    command: &'static str,
    args: &'static [&'static str],
    grace: Duration,
}

impl Default for RecoveryReboot {
    fn default() -> Self {
        Self {
            command: "reboot",
            args: &["recovery"],
            grace: Duration::from_secs(5),
        }
    }
}

impl RebootTrigger for RecoveryReboot {
    fn trigger(&self) -> Result<(), RebootError> {
        info!(command = self.command, "issuing reboot request");
        if let Err(err) = Command::new(self.command).args(self.args).spawn() {
            error!(%err, "reboot command failed to start");
            return Err(RebootError::CommandFailed(err.to_string()));
        }

        // If the reboot takes, this sleep never returns.
        thread::sleep(self.grace);
        warn!("still alive after reboot grace period");
        Err(RebootError::StillAliveAfterGrace)
    }
}
