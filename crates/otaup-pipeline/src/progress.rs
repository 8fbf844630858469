use std::time::{Duration, Instant};

/// Snapshot of a download in flight. `total` is 0 when the store cannot
/// determine the object size up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub transferred: u64,
    pub total: u64,
    pub rate_bytes_per_sec: u64,
}

impl DownloadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.transferred * 100) / self.total).min(100) as u8
    }
}

/// Transfer-rate estimator that recomputes once per window and holds the
/// value steady in between, so displayed rates do not flicker with every
/// chunk.
#[derive(Debug)]
pub struct RateWindow {
    window: Duration,
    window_start: Instant,
    window_base: u64,
    rate: u64,
}

impl RateWindow {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            window_start: Instant::now(),
            window_base: 0,
            rate: 0,
        }
    }

    /// Feeds the cumulative transferred byte count and returns the current
    /// rate estimate.
    pub fn update(&mut self, transferred: u64) -> u64 {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            let bytes = transferred.saturating_sub(self.window_base);
            self.rate = (bytes as f64 / elapsed.as_secs_f64()) as u64;
            self.window_start = Instant::now();
            self.window_base = transferred;
        }
        self.rate
    }
}

impl Default for RateWindow {
    fn default() -> Self {
        Self::new()
    }
}
