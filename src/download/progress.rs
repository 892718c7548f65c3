//! Transfer progress snapshots and the smoothed ETA computation.

use std::time::Duration;

use super::estimator::MovingAverage;

/// One progress report, emitted after every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes written to staging so far.
    pub bytes_transferred: u64,
    /// Declared total, when known and positive.
    pub total_bytes: Option<u64>,
    /// Wall-clock time since the transfer started.
    pub elapsed: Duration,
    /// Smoothed remaining time, whole seconds. `None` while indeterminate.
    pub eta: Option<Duration>,
    /// Completion in `0..=100`. `None` while indeterminate.
    pub percent: Option<u8>,
}

/// Receives progress snapshots from a download session.
pub trait ProgressObserver {
    /// Called after each chunk is written.
    fn on_progress(&mut self, progress: &TransferProgress);
}

/// Observer that discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: &TransferProgress) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(&TransferProgress),
{
    fn on_progress(&mut self, progress: &TransferProgress) {
        self(progress);
    }
}

/// Turns raw transfer accounting into smoothed progress snapshots.
#[derive(Debug, Clone)]
pub struct EtaTracker {
    total_bytes: Option<u64>,
    window: MovingAverage,
}

impl EtaTracker {
    /// Creates a tracker; a zero `total_bytes` is treated as unknown.
    #[must_use]
    pub fn new(total_bytes: Option<u64>, window: usize) -> Self {
        Self {
            total_bytes: total_bytes.filter(|&total| total > 0),
            window: MovingAverage::new(window),
        }
    }

    /// Declared total, if known.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Records one observation and returns the resulting snapshot.
    ///
    /// The naive estimate `elapsed * remaining / transferred` (milliseconds) is
    /// added to the window only when it is defined: a known total, at least one
    /// byte transferred and a non-zero elapsed time. The reported ETA is the
    /// window average rounded down to whole seconds.
    pub fn observe(&mut self, bytes_transferred: u64, elapsed: Duration) -> TransferProgress {
        let Some(total) = self.total_bytes else {
            return TransferProgress {
                bytes_transferred,
                total_bytes: None,
                elapsed,
                eta: None,
                percent: None,
            };
        };

        let elapsed_ms = elapsed.as_millis();
        if bytes_transferred > 0 && elapsed_ms > 0 {
            let remaining = u128::from(total.saturating_sub(bytes_transferred));
            let estimate_ms = elapsed_ms * remaining / u128::from(bytes_transferred);
            self.window
                .add_sample(u64::try_from(estimate_ms).unwrap_or(u64::MAX));
        }

        let eta = self
            .window
            .average()
            .ok()
            .map(|avg_ms| Duration::from_secs(avg_ms / 1000));

        TransferProgress {
            bytes_transferred,
            total_bytes: Some(total),
            elapsed,
            eta,
            percent: Some(percent_complete(bytes_transferred, total)),
        }
    }
}

/// Completion percentage clamped to `0..=100`; `total` must be positive.
fn percent_complete(bytes_transferred: u64, total: u64) -> u8 {
    let pct = u128::from(bytes_transferred) * 100 / u128::from(total.max(1));
    u8::try_from(pct.min(100)).unwrap_or(100)
}
