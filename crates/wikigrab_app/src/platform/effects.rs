use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_error, engine_info, engine_warn};
use wikigrab_core::{Effect, ImageResultKind, Msg, RunEndKind, RunTotals};
use wikigrab_engine::{
    CrawlRequest, CrawlSettings, DownloadOutcome, EngineEvent, EngineHandle, ProgressSnapshot,
    RunStatus,
};

use super::persistence::save_settings;

/// Executes effects emitted by `update` and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
    settings_path: PathBuf,
}

impl EffectRunner {
    pub fn new(crawl_settings: CrawlSettings, settings_path: PathBuf) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(crawl_settings).context("failed to build HTTP client")?;
        Ok(Self {
            engine,
            settings_path,
        })
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun {
                    start_url,
                    save_path,
                } => {
                    engine_info!("StartRun url={} save_path={}", start_url, save_path);
                    self.engine.start(CrawlRequest {
                        start_url,
                        dest_dir: PathBuf::from(save_path),
                    });
                }
                Effect::StopRun => {
                    engine_info!("StopRun");
                    self.engine.stop();
                }
                Effect::PersistSettings(settings) => {
                    save_settings(&self.settings_path, &settings);
                }
            }
        }
    }

    /// Wait up to `timeout` for the next engine event; `Msg::Tick` when none
    /// arrived.
    pub fn next_msg(&self, timeout: Duration) -> Msg {
        msg_from_recv(self.engine.recv_timeout(timeout))
    }
}

/// A disconnected channel means the worker is gone, so the run can never
/// report its own end.
fn msg_from_recv(received: Result<EngineEvent, RecvTimeoutError>) -> Msg {
    match received {
        Ok(event) => map_event(event),
        Err(RecvTimeoutError::Timeout) => Msg::Tick,
        Err(RecvTimeoutError::Disconnected) => {
            engine_error!("Engine worker exited before the run finished");
            Msg::RunFinished {
                outcome: RunEndKind::Failed {
                    reason: "engine worker stopped unexpectedly".to_string(),
                },
                totals: RunTotals::default(),
            }
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ListingStarted { .. } => Msg::ListingStarted,
        EngineEvent::PagesListed { total } => Msg::PagesListed { total },
        EngineEvent::OutputDirCreated { path } => Msg::OutputDirCreated {
            path: path.display().to_string(),
        },
        EngineEvent::PageStarted { index, total, url } => Msg::PageStarted { index, total, url },
        EngineEvent::ImagesFound { page_url, count } => Msg::ImagesFound { page_url, count },
        EngineEvent::ImageDownloadStarted {
            filename,
            image_url,
        } => Msg::ImageDownloading {
            filename,
            image_url,
        },
        EngineEvent::ImageProcessed {
            image_url, report, ..
        } => Msg::ImageDone {
            filename: report.filename,
            image_url,
            result: map_outcome(report.outcome),
        },
        EngineEvent::PageFailed { page_url, error } => Msg::PageFailed {
            page_url,
            message: error.to_string(),
        },
        EngineEvent::PageFinished {
            index,
            total,
            skipped,
            ..
        } => Msg::PageFinished {
            index,
            total,
            skipped,
        },
        EngineEvent::RunFinished(summary) => Msg::RunFinished {
            outcome: match summary.status {
                RunStatus::Completed => RunEndKind::Completed,
                RunStatus::Stopped => RunEndKind::Stopped,
                RunStatus::Failed { reason } => RunEndKind::Failed { reason },
            },
            totals: map_totals(&summary.progress),
        },
    }
}

fn map_outcome(outcome: DownloadOutcome) -> ImageResultKind {
    match outcome {
        DownloadOutcome::Saved { bytes, .. } => ImageResultKind::Saved { bytes },
        DownloadOutcome::SkippedPattern => ImageResultKind::SkippedPattern,
        DownloadOutcome::SkippedDuplicate => ImageResultKind::SkippedDuplicate,
        DownloadOutcome::SkippedNonImageResponse { content_type } => {
            engine_warn!("Non-image response ({})", content_type);
            ImageResultKind::SkippedHtml
        }
        DownloadOutcome::Failed(error) => ImageResultKind::Failed {
            message: error.to_string(),
        },
    }
}

fn map_totals(progress: &ProgressSnapshot) -> RunTotals {
    RunTotals {
        pages_total: progress.pages_total,
        pages_done: progress.pages_done,
        images_saved: progress.images_saved,
        images_skipped: progress.images_skipped,
        images_failed: progress.images_failed,
    }
}
