use std::sync::{Mutex, PoisonError};

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use otaup_pipeline::{PipelineEvent, PipelineState};
use tracing::{error, warn};

/// Renders pipeline events as terminal output. Events arrive from the
/// worker thread, so the active bar sits behind a mutex.
pub struct Renderer {
    bar: Mutex<Option<ProgressBar>>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    pub fn handle(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::StateChanged(state) => self.enter_state(state),
            PipelineEvent::DownloadProgress(progress) => {
                let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(bar) = guard.as_ref() {
                    bar.set_length(progress.total.max(1));
                    bar.set_position(progress.transferred);
                    bar.set_message(format!("{}/s", HumanBytes(progress.rate_bytes_per_sec)));
                }
            }
            PipelineEvent::ExtractProgress(percent) => {
                let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(bar) = guard.as_ref() {
                    bar.set_position(u64::from(percent));
                }
            }
            PipelineEvent::SoftFailures(entries) => {
                for entry in entries {
                    warn!(%entry, "could not place entry");
                }
            }
            PipelineEvent::Failed(message) => {
                self.clear_bar();
                error!(%message, "update failed");
            }
            PipelineEvent::ManualRebootRequired(_) => {
                println!("Automatic reboot failed. Reboot the device manually to finish the update.");
            }
        }
    }

    fn enter_state(&self, state: PipelineState) {
        self.clear_bar();
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        match state {
            PipelineState::Downloading => {
                println!("Downloading update...");
                let bar = ProgressBar::new(1);
                if let Ok(style) = ProgressStyle::with_template(
                    "[{bar:24.cyan/blue}] {bytes}/{total_bytes} {msg}",
                ) {
                    bar.set_style(style.progress_chars("=>-"));
                }
                *guard = Some(bar);
            }
            PipelineState::Extracting => {
                println!("Extracting...");
                let bar = ProgressBar::new(100);
                if let Ok(style) =
                    ProgressStyle::with_template("[{bar:24.cyan/blue}] {pos:>3}%")
                {
                    bar.set_style(style.progress_chars("=>-"));
                }
                *guard = Some(bar);
            }
            PipelineState::Relocating => println!("Applying update..."),
            PipelineState::AwaitingReboot => println!("Update applied."),
            PipelineState::Cancelled => println!("Update cancelled."),
            _ => {}
        }
    }

    fn clear_bar(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
