//! Cooperative idle-scan scheduling.
//!
//! Scanning is amortized so a large diff never blocks the host's event
//! thread: while a scan task is scheduled, the host calls
//! [`DiffView::idle_scan`](crate::core::DiffView::idle_scan) once per idle
//! slice, and each slice covers at most [`IDLE_SCAN_BATCH`] lines. There is
//! no real concurrency; everything runs on the single event thread between
//! discrete operations.

/// Lines scanned per idle slice.
pub const IDLE_SCAN_BATCH: usize = 30;

/// Pending-task state for the amortized background scan.
///
/// Stands in for a host scheduler's `schedule_idle`/`cancel` pair: the host
/// polls while a task is scheduled and the engine cancels it when the scan
/// catches up or the index is invalidated.
#[derive(Debug, Default)]
pub struct ScanScheduler {
    pending: bool,
}

impl ScanScheduler {
    /// Create a scheduler with no pending task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an idle scan task as pending. Idempotent.
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Drop the pending task, if any.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Whether an idle scan task is currently pending.
    pub fn is_scheduled(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_and_cancel() {
        let mut scheduler = ScanScheduler::new();
        assert!(!scheduler.is_scheduled());
        scheduler.schedule();
        scheduler.schedule();
        assert!(scheduler.is_scheduled());
        scheduler.cancel();
        assert!(!scheduler.is_scheduled());
    }
}
