//! Transfer progress tracking
//!
//! A [`ProgressTracker`] is the explicit context object shared between a
//! streaming transfer and its callback. The transport advances it inline
//! from the read/write loop, so every reported percentage corresponds to
//! bytes that have actually moved.

/// Callback invoked on every progress tick
pub type ProgressCallback = Box<dyn FnMut(TransferProgress) + Send + Sync>;

/// Snapshot handed to a [`ProgressCallback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes moved so far
    pub transferred: u64,
    /// Declared total size
    pub total: u64,
    /// `ceil(round(transferred / total * 100, 2))`
    pub percent: u64,
}

/// Percentage as `ceil(round(transferred / total * 100, 2))`
///
/// Returns `None` when `total` is zero, so callers skip reporting instead
/// of dividing by zero.
pub fn progress_percent(transferred: u64, total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    let raw = transferred as f64 / total as f64 * 100.0;
    let rounded = (raw * 100.0).round() / 100.0;
    Some(rounded.ceil() as u64)
}

/// Running byte count for one transfer
pub struct ProgressTracker {
    transferred: u64,
    total: Option<u64>,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Create a tracker for a transfer of `total` bytes (if known)
    pub fn new(total: Option<u64>, callback: Option<ProgressCallback>) -> Self {
        Self {
            transferred: 0,
            total,
            callback,
        }
    }

    /// Record `bytes` more and notify the callback
    ///
    /// The callback is skipped when the total is unknown or zero.
    pub fn advance(&mut self, bytes: u64) {
        self.transferred += bytes;
        let Some(total) = self.total else {
            return;
        };
        let Some(percent) = progress_percent(self.transferred, total) else {
            return;
        };
        if let Some(cb) = self.callback.as_mut() {
            cb(TransferProgress {
                transferred: self.transferred,
                total,
                percent,
            });
        }
    }

    /// Bytes recorded so far
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Declared total, if known
    pub fn total(&self) -> Option<u64> {
        self.total
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("transferred", &self.transferred)
            .field("total", &self.total)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
