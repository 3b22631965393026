use std::sync::atomic::{AtomicUsize, Ordering};

use elecmate_core::bulk::ExportProgress;

/// Forwards export progress to a caller callback, never letting the
/// reported `current` go backwards.
///
/// Documents finish out of order, so a late callback may carry a smaller
/// count than one already shown.
pub struct ProgressTracker<F> {
    highest: AtomicUsize,
    callback: F,
}

impl<F> ProgressTracker<F>
where
    F: Fn(ExportProgress) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            highest: AtomicUsize::new(0),
            callback,
        }
    }

    pub fn report(&self, progress: ExportProgress) {
        let previous = self.highest.fetch_max(progress.current, Ordering::AcqRel);
        let current = previous.max(progress.current).min(progress.total);
        (self.callback)(ExportProgress {
            current,
            ..progress
        });
    }

    /// Highest `current` reported so far.
    pub fn current(&self) -> usize {
        self.highest.load(Ordering::Acquire)
    }
}
