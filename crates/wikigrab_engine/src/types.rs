use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

/// Lifecycle of one crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Listing,
    ProcessingPages,
    Completed,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Stopped,
    Failed { reason: String },
}

impl RunStatus {
    pub fn phase(&self) -> RunPhase {
        match self {
            RunStatus::Completed => RunPhase::Completed,
            RunStatus::Stopped => RunPhase::Stopped,
            RunStatus::Failed { .. } => RunPhase::Failed,
        }
    }
}

/// Latest-value view of the run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub phase: RunPhase,
    pub pages_total: usize,
    pub pages_done: usize,
    pub pages_failed: usize,
    pub images_found: usize,
    pub images_saved: usize,
    pub images_skipped: usize,
    pub images_failed: usize,
}

impl ProgressSnapshot {
    /// `pages_done / pages_total`, clamped to `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if self.pages_total == 0 {
            return if self.phase == RunPhase::Completed { 1.0 } else { 0.0 };
        }
        (self.pages_done as f64 / self.pages_total as f64).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub progress: ProgressSnapshot,
}

/// Classified result of processing one image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { bytes: u64, path: PathBuf },
    SkippedPattern,
    SkippedDuplicate,
    SkippedNonImageResponse { content_type: String },
    Failed(FetchError),
}

impl DownloadOutcome {
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            DownloadOutcome::SkippedPattern
                | DownloadOutcome::SkippedDuplicate
                | DownloadOutcome::SkippedNonImageResponse { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub filename: String,
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ListingStarted {
        start_url: String,
    },
    PagesListed {
        total: usize,
    },
    OutputDirCreated {
        path: PathBuf,
    },
    PageStarted {
        index: usize,
        total: usize,
        url: String,
    },
    ImagesFound {
        page_url: String,
        count: usize,
    },
    ImageDownloadStarted {
        filename: String,
        image_url: String,
    },
    ImageProcessed {
        page_url: String,
        image_url: String,
        report: DownloadReport,
    },
    PageFailed {
        page_url: String,
        error: FetchError,
    },
    PageFinished {
        index: usize,
        total: usize,
        saved: usize,
        skipped: usize,
    },
    RunFinished(RunSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Bytes,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
