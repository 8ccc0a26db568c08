use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{DownloadOutcome, ProgressSnapshot, RunPhase};

/// State of a single crawl run, shared between the worker and whoever
/// started it. Cloning shares the same run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancel: CancellationToken,
    counters: Arc<RunCounters>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop. In-flight requests are allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.counters.snapshot()
    }
}

/// Counters mutated only by the worker; readers see latest values.
#[derive(Debug, Default)]
pub struct RunCounters {
    phase: AtomicU8,
    pages_total: AtomicUsize,
    pages_done: AtomicUsize,
    pages_failed: AtomicUsize,
    images_found: AtomicUsize,
    images_saved: AtomicUsize,
    images_skipped: AtomicUsize,
    images_failed: AtomicUsize,
}

impl RunCounters {
    pub(crate) fn set_phase(&self, phase: RunPhase) {
        self.phase.store(phase_to_u8(phase), Ordering::Relaxed);
    }

    pub(crate) fn set_pages_total(&self, total: usize) {
        self.pages_total.store(total, Ordering::Relaxed);
    }

    pub(crate) fn page_done(&self, failed: bool) {
        if failed {
            self.pages_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.pages_done.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn images_found(&self, count: usize) {
        self.images_found.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record(&self, outcome: &DownloadOutcome) {
        let counter = match outcome {
            DownloadOutcome::Saved { .. } => &self.images_saved,
            DownloadOutcome::Failed(_) => &self.images_failed,
            DownloadOutcome::SkippedPattern
            | DownloadOutcome::SkippedDuplicate
            | DownloadOutcome::SkippedNonImageResponse { .. } => &self.images_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: phase_from_u8(self.phase.load(Ordering::Relaxed)),
            pages_total: self.pages_total.load(Ordering::Relaxed),
            pages_done: self.pages_done.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            images_found: self.images_found.load(Ordering::Relaxed),
            images_saved: self.images_saved.load(Ordering::Relaxed),
            images_skipped: self.images_skipped.load(Ordering::Relaxed),
            images_failed: self.images_failed.load(Ordering::Relaxed),
        }
    }
}

fn phase_to_u8(phase: RunPhase) -> u8 {
    match phase {
        RunPhase::Idle => 0,
        RunPhase::Listing => 1,
        RunPhase::ProcessingPages => 2,
        RunPhase::Completed => 3,
        RunPhase::Stopped => 4,
        RunPhase::Failed => 5,
    }
}

fn phase_from_u8(value: u8) -> RunPhase {
    match value {
        1 => RunPhase::Listing,
        2 => RunPhase::ProcessingPages,
        3 => RunPhase::Completed,
        4 => RunPhase::Stopped,
        5 => RunPhase::Failed,
        _ => RunPhase::Idle,
    }
}
