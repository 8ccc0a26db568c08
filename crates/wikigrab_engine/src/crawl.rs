use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use url::Url;

use crate::download::Downloader;
use crate::fetch::{FetchSettings, Fetcher, ProgressSink};
use crate::images::extract_images;
use crate::pages::list_pages;
use crate::persist::{ensure_output_dir, PersistError};
use crate::run::RunContext;
use crate::skip::SkipFilter;
use crate::{DownloadOutcome, EngineEvent, RunPhase, RunStatus, RunSummary};

/// Pause between pages to bound the request rate against the wiki.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub fetch: FetchSettings,
    pub page_delay: Duration,
    pub skip_filter: SkipFilter,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            page_delay: DEFAULT_PAGE_DELAY,
            skip_filter: SkipFilter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub start_url: String,
    pub dest_dir: PathBuf,
}

/// Run one crawl to its terminal state. Emits `RunFinished` exactly once.
pub async fn crawl(
    fetcher: &dyn Fetcher,
    request: &CrawlRequest,
    settings: &CrawlSettings,
    ctx: &RunContext,
    sink: &dyn ProgressSink,
) -> RunSummary {
    let status = run_to_end(fetcher, request, settings, ctx, sink).await;
    ctx.counters().set_phase(status.phase());

    let summary = RunSummary {
        status,
        progress: ctx.snapshot(),
    };
    engine_info!(
        "Run finished: {:?} pages={}/{} saved={} skipped={} failed={}",
        summary.status,
        summary.progress.pages_done,
        summary.progress.pages_total,
        summary.progress.images_saved,
        summary.progress.images_skipped,
        summary.progress.images_failed
    );
    sink.emit(EngineEvent::RunFinished(summary.clone()));
    summary
}

async fn run_to_end(
    fetcher: &dyn Fetcher,
    request: &CrawlRequest,
    settings: &CrawlSettings,
    ctx: &RunContext,
    sink: &dyn ProgressSink,
) -> RunStatus {
    let counters = ctx.counters();

    counters.set_phase(RunPhase::Listing);
    sink.emit(EngineEvent::ListingStarted {
        start_url: request.start_url.clone(),
    });
    let pages = match list_pages(fetcher, &request.start_url).await {
        Ok(pages) => pages,
        Err(err) => {
            engine_error!("Listing {} failed: {}", request.start_url, err);
            return RunStatus::Failed {
                reason: format!("failed to list pages: {err}"),
            };
        }
    };
    let total = pages.len();
    counters.set_pages_total(total);
    sink.emit(EngineEvent::PagesListed { total });

    match ensure_output_dir(&request.dest_dir) {
        Ok(true) => sink.emit(EngineEvent::OutputDirCreated {
            path: request.dest_dir.clone(),
        }),
        Ok(false) => {}
        Err(err) => return filesystem_failure(err),
    }

    counters.set_phase(RunPhase::ProcessingPages);
    let downloader = Downloader::new(fetcher, &settings.skip_filter);

    for (index, page_url) in pages.iter().enumerate() {
        if index > 0 && !settings.page_delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(settings.page_delay) => {}
                _ = ctx.cancellation().cancelled() => {}
            }
        }
        if ctx.is_cancelled() {
            engine_info!("Stop observed before page {}/{}", index + 1, total);
            return RunStatus::Stopped;
        }

        sink.emit(EngineEvent::PageStarted {
            index,
            total,
            url: page_url.to_string(),
        });
        let tally = match process_page(fetcher, &downloader, page_url, request, ctx, sink).await {
            Ok(tally) => tally,
            Err(err) => return filesystem_failure(err),
        };
        counters.page_done(tally.failed);
        sink.emit(EngineEvent::PageFinished {
            index,
            total,
            saved: tally.saved,
            skipped: tally.skipped,
        });
    }

    if ctx.is_cancelled() {
        RunStatus::Stopped
    } else {
        RunStatus::Completed
    }
}

#[derive(Debug, Default)]
struct PageTally {
    saved: usize,
    skipped: usize,
    failed: bool,
}

async fn process_page(
    fetcher: &dyn Fetcher,
    downloader: &Downloader<'_>,
    page_url: &Url,
    request: &CrawlRequest,
    ctx: &RunContext,
    sink: &dyn ProgressSink,
) -> Result<PageTally, PersistError> {
    let mut tally = PageTally::default();

    let images = match extract_images(fetcher, page_url).await {
        Ok(images) => images,
        Err(error) => {
            engine_warn!("Page {} failed: {}", page_url, error);
            sink.emit(EngineEvent::PageFailed {
                page_url: page_url.to_string(),
                error,
            });
            tally.failed = true;
            return Ok(tally);
        }
    };

    ctx.counters().images_found(images.len());
    if !images.is_empty() {
        sink.emit(EngineEvent::ImagesFound {
            page_url: page_url.to_string(),
            count: images.len(),
        });
    }

    for image_url in &images {
        if ctx.is_cancelled() {
            break;
        }
        let report = downloader
            .download(image_url, page_url, &request.dest_dir, sink)
            .await?;
        ctx.counters().record(&report.outcome);
        if report.outcome.is_skip() {
            tally.skipped += 1;
        } else if matches!(report.outcome, DownloadOutcome::Saved { .. }) {
            tally.saved += 1;
        }
        sink.emit(EngineEvent::ImageProcessed {
            page_url: page_url.to_string(),
            image_url: image_url.to_string(),
            report,
        });
    }

    Ok(tally)
}

fn filesystem_failure(err: PersistError) -> RunStatus {
    engine_error!("Destination not writable: {}", err);
    RunStatus::Failed {
        reason: format!("filesystem error: {err}"),
    }
}
