use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use otaup_core::{CancelFlag, DeviceFingerprint, DeviceProbe, UpdateCandidate, update_available};
use otaup_installer::{
    classify, extract, relocate, remove_with_retry, verify_archive, ExtractError, RebootTrigger,
    UpdateLayout,
};
use otaup_store::{
    find_app_update, find_mcu_update, find_system_update, DownloadError, PackageStore,
};
use tracing::{debug, error, info, warn};

use crate::progress::{DownloadProgress, RateWindow};
use crate::{PipelineError, PipelineState};

/// Which catalog folder to scan for an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateChannel {
    System,
    Mcu,
    App,
}

impl UpdateChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Mcu => "mcu",
            Self::App => "app",
        }
    }
}

/// Everything observable about a running attempt. Events are emitted from
/// the worker thread; handlers must be quick and must not call back into
/// the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    DownloadProgress(DownloadProgress),
    ExtractProgress(u8),
    /// Secondary entries the relocation could not place. The update itself
    /// still applied.
    SoftFailures(Vec<String>),
    Failed(String),
    /// The reboot command did not take; the operator must reboot by hand.
    ManualRebootRequired(String),
}

struct Inner {
    state: PipelineState,
    // Retained across cancellation so a paused attempt can be resumed.
    last_request: Option<UpdateCandidate>,
}

struct Shared {
    store: Arc<dyn PackageStore>,
    layout: UpdateLayout,
    reboot: Arc<dyn RebootTrigger>,
    on_event: Box<dyn Fn(PipelineEvent) + Send + Sync>,
    cancel: CancelFlag,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PipelineEvent) {
        (self.on_event)(event);
    }

    fn set_state(&self, state: PipelineState) {
        {
            let mut inner = self.lock();
            if inner.state == state {
                return;
            }
            debug!(from = inner.state.as_str(), to = state.as_str(), "state change");
            inner.state = state;
        }
        self.emit(PipelineEvent::StateChanged(state));
    }
}

/// Drives one update at a time from catalog scan through relocation.
///
/// All state lives behind the pipeline's own mutex; there is exactly one
/// worker thread per attempt and `start` rejects overlapping attempts.
pub struct UpdatePipeline {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl UpdatePipeline {
    pub fn new(
        store: Arc<dyn PackageStore>,
        layout: UpdateLayout,
        reboot: Arc<dyn RebootTrigger>,
        on_event: impl Fn(PipelineEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                layout,
                reboot,
                on_event: Box::new(on_event),
                cancel: CancelFlag::new(),
                inner: Mutex::new(Inner {
                    state: PipelineState::Idle,
                    last_request: None,
                }),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.shared.lock().state
    }

    /// Scans the given catalog channel for an update newer than what the
    /// probe reports. Only runs from `Idle`.
    pub fn check(
        &self,
        channel: UpdateChannel,
        probe: &dyn DeviceProbe,
    ) -> Result<Option<UpdateCandidate>, PipelineError> {
        {
            let mut inner = self.shared.lock();
            if inner.state != PipelineState::Idle {
                return Err(PipelineError::Busy(inner.state.as_str()));
            }
            inner.state = PipelineState::Checking;
        }
        self.shared.emit(PipelineEvent::StateChanged(PipelineState::Checking));

        let result = self.scan_catalog(channel, probe);
        self.shared.set_state(PipelineState::Idle);
        result
    }

    fn scan_catalog(
        &self,
        channel: UpdateChannel,
        probe: &dyn DeviceProbe,
    ) -> Result<Option<UpdateCandidate>, PipelineError> {
        let fingerprint = DeviceFingerprint::from_probe(probe);
        info!(
            channel = channel.as_str(),
            token = %fingerprint.catalog_token(),
            "checking for updates"
        );
        let store = self.shared.store.as_ref();
        let candidate = match channel {
            UpdateChannel::System => find_system_update(store, &fingerprint)?
                .filter(|c| update_available(&c.version, &probe.system_build_date())),
            // MCU firmware carries no comparable version; an archive in the
            // catalog is always offered.
            UpdateChannel::Mcu => find_mcu_update(store, fingerprint.cpu.mcu_tag())?,
            UpdateChannel::App => find_app_update(store, &fingerprint)?
                .filter(|c| update_available(&c.version, &probe.app_build_timestamp())),
        };
        match &candidate {
            Some(c) => info!(version = %c.version, key = %c.object_key, "update available"),
            None => info!(channel = channel.as_str(), "no update available"),
        }
        Ok(candidate)
    }

    /// Kicks off the download/extract/relocate worker for `candidate`.
    /// Returns immediately; progress arrives through events.
    pub fn start(&self, candidate: UpdateCandidate) -> Result<(), PipelineError> {
        {
            let mut inner = self.shared.lock();
            match inner.state {
                PipelineState::Idle | PipelineState::Failed | PipelineState::Cancelled => {}
                other => return Err(PipelineError::Busy(other.as_str())),
            }
            self.shared.cancel.reset();
            inner.last_request = Some(candidate.clone());
            inner.state = PipelineState::Downloading;
        }
        self.shared.emit(PipelineEvent::StateChanged(PipelineState::Downloading));
        info!(version = %candidate.version, key = %candidate.object_key, "starting update");

        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || run_attempt(&shared, &candidate));

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = worker.replace(handle) {
            // Only resting states reach here, so the old worker is done.
            let _ = previous.join();
        }
        Ok(())
    }

    /// Requests cancellation of the in-flight attempt. Ignored during
    /// relocation: a half-placed target root is worse than finishing.
    pub fn cancel(&self) {
        match self.state() {
            PipelineState::Checking | PipelineState::Downloading | PipelineState::Extracting => {
                info!("cancelling update attempt");
                self.shared.cancel.cancel();
            }
            PipelineState::Relocating => {
                warn!("cancellation ignored while relocating into the target root");
            }
            other => debug!(state = other.as_str(), "nothing to cancel"),
        }
    }

    /// Pausing is cancellation that remembers the request; `resume`
    /// restarts the same update from the beginning.
    pub fn pause(&self) {
        self.cancel();
    }

    pub fn resume(&self) -> Result<(), PipelineError> {
        let candidate = self
            .shared
            .lock()
            .last_request
            .clone()
            .ok_or(PipelineError::NothingToResume)?;
        self.start(candidate)
    }

    /// Fires the reboot trigger once an update has been applied. On failure
    /// the state stays `AwaitingReboot` and a manual-reboot event is
    /// emitted.
    pub fn confirm_reboot(&self) -> Result<(), PipelineError> {
        let state = self.state();
        if state != PipelineState::AwaitingReboot {
            return Err(PipelineError::NotAwaitingReboot(state.as_str()));
        }
        match self.shared.reboot.trigger() {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(%err, "reboot did not take");
                self.shared
                    .emit(PipelineEvent::ManualRebootRequired(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Removes leftover work files from the last attempt and returns the
    /// machine to `Idle`. Safe to call repeatedly; missing files are not an
    /// error.
    pub fn cleanup(&self) -> Result<(), PipelineError> {
        let request = {
            let inner = self.shared.lock();
            match inner.state {
                PipelineState::Idle | PipelineState::Failed | PipelineState::Cancelled => {}
                other => return Err(PipelineError::Busy(other.as_str())),
            }
            inner.last_request.clone()
        };

        if let Some(request) = request {
            remove_with_retry(&self.shared.layout.download_path(&request.object_key))?;
            remove_with_retry(&self.shared.layout.staging_dir(&request.object_key))?;
        }
        self.shared.set_state(PipelineState::Idle);
        Ok(())
    }

    /// Blocks until the current worker finishes. Intended for hosts that
    /// drive the pipeline synchronously and for tests.
    pub fn wait(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

enum Halt {
    Cancelled,
    Failed(String),
}

fn run_attempt(shared: &Shared, candidate: &UpdateCandidate) {
    match run_stages(shared, candidate) {
        Ok(()) => {}
        Err(Halt::Cancelled) => {
            info!(key = %candidate.object_key, "update cancelled");
            shared.set_state(PipelineState::Cancelled);
        }
        Err(Halt::Failed(message)) => {
            error!(key = %candidate.object_key, %message, "update failed");
            shared.emit(PipelineEvent::Failed(message));
            shared.set_state(PipelineState::Failed);
        }
    }
}

fn run_stages(shared: &Shared, candidate: &UpdateCandidate) -> Result<(), Halt> {
    let archive = shared.layout.download_path(&candidate.object_key);
    let staging = shared.layout.staging_dir(&candidate.object_key);

    shared
        .layout
        .ensure_base_dirs()
        .map_err(|err| Halt::Failed(format!("cannot prepare work directories: {err}")))?;
    // Stale artifacts from an earlier attempt are restarted from zero.
    remove_with_retry(&archive)
        .and_then(|()| remove_with_retry(&staging))
        .map_err(|err| Halt::Failed(format!("cannot clear previous work files: {err}")))?;

    download_stage(shared, candidate, &archive)?;

    shared.set_state(PipelineState::Extracting);
    let result = extract(
        &archive,
        &staging,
        &mut |percent| shared.emit(PipelineEvent::ExtractProgress(percent)),
        &shared.cancel,
    );
    match result {
        Ok(()) => {}
        Err(ExtractError::Cancelled) => return Err(Halt::Cancelled),
        Err(err) => return Err(Halt::Failed(format!("extraction failed: {err}"))),
    }
    // The archive has served its purpose; keep the disk free for staging.
    if let Err(err) = remove_with_retry(&archive) {
        warn!(archive = %archive.display(), %err, "failed to delete extracted archive");
    }

    shared.set_state(PipelineState::Relocating);
    let shape = classify(&staging);
    info!(shape = shape.as_str(), "relocating staged update");
    match relocate(&staging, shared.layout.target_root(), shape) {
        Ok(report) => {
            if !report.is_clean() {
                warn!(count = report.soft_failures.len(), "update applied with soft failures");
                shared.emit(PipelineEvent::SoftFailures(report.soft_failures));
            }
            shared.set_state(PipelineState::AwaitingReboot);
            Ok(())
        }
        Err(err) => Err(Halt::Failed(format!("relocation failed: {err}"))),
    }
}

fn download_stage(
    shared: &Shared,
    candidate: &UpdateCandidate,
    archive: &std::path::Path,
) -> Result<(), Halt> {
    let mut rate = RateWindow::new();
    let mut last_percent: i16 = -1;
    let result = shared.store.download(
        &candidate.object_key,
        archive,
        &mut |transferred, total| {
            let progress = DownloadProgress {
                transferred,
                total,
                rate_bytes_per_sec: rate.update(transferred),
            };
            // Reported on percent change only, plus the final byte count.
            let percent = progress.percent() as i16;
            if percent != last_percent || transferred == total {
                last_percent = percent;
                shared.emit(PipelineEvent::DownloadProgress(progress));
            }
        },
        &shared.cancel,
    );
    match result {
        Ok(()) => {}
        Err(DownloadError::Cancelled) => return Err(Halt::Cancelled),
        Err(err) => return Err(Halt::Failed(format!("download failed: {err}"))),
    }

    if let Some(expected) = &candidate.sha256 {
        if let Err(err) = verify_archive(archive, expected) {
            let _ = remove_with_retry(archive);
            return Err(Halt::Failed(format!("archive verification failed: {err}")));
        }
    }
    Ok(())
}
