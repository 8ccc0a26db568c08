use url::Url;

use crate::{AppState, Effect, ImageResultKind, Msg, RunEndKind, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(raw) => {
            if state.set_url(raw.trim().to_string()) {
                vec![Effect::PersistSettings(state.settings().clone())]
            } else {
                Vec::new()
            }
        }
        Msg::SavePathChanged(raw) => {
            if state.set_save_path(raw.trim().to_string()) {
                vec![Effect::PersistSettings(state.settings().clone())]
            } else {
                Vec::new()
            }
        }
        Msg::StartClicked => start(&mut state),
        Msg::StopClicked => {
            let view = state.view();
            if view.can_stop {
                state.request_stop();
                state.log("Stopping download...");
                vec![Effect::StopRun]
            } else {
                Vec::new()
            }
        }
        Msg::ListingStarted => {
            state.set_session(SessionState::Listing);
            state.log("Starting page list retrieval");
            Vec::new()
        }
        Msg::PagesListed { total } => {
            state.totals_mut().pages_total = total;
            if total == 0 {
                state.log("No page URLs found");
            } else {
                state.log(format!("Found {total} pages"));
            }
            Vec::new()
        }
        Msg::OutputDirCreated { path } => {
            state.log(format!("Created save folder: {path}"));
            Vec::new()
        }
        Msg::PageStarted { index, total, url } => {
            state.set_session(SessionState::ProcessingPages);
            if !state.view().stop_requested {
                state.set_status(format!("Processing page {}/{}", index + 1, total));
            }
            state.log(format!("Processing page {}/{}: {}", index + 1, total, url));
            Vec::new()
        }
        Msg::ImagesFound { page_url, count } => {
            state.log(format!("Found {count} images on page {page_url}"));
            Vec::new()
        }
        Msg::ImageDownloading {
            filename,
            image_url,
        } => {
            state.log(format!("Downloading image: {filename} from {image_url}"));
            Vec::new()
        }
        Msg::ImageDone {
            filename,
            image_url,
            result,
        } => {
            let line = match result {
                ImageResultKind::Saved { bytes } => {
                    state.totals_mut().images_saved += 1;
                    format!("Saved image: {filename} ({bytes} bytes)")
                }
                ImageResultKind::SkippedPattern => {
                    state.totals_mut().images_skipped += 1;
                    format!("Skipped image (excluded pattern): {filename}")
                }
                ImageResultKind::SkippedDuplicate => {
                    state.totals_mut().images_skipped += 1;
                    format!("Skipped image (existing file): {filename}")
                }
                ImageResultKind::SkippedHtml => {
                    state.totals_mut().images_skipped += 1;
                    format!("Image URL returned HTML: {image_url}")
                }
                ImageResultKind::Failed { message } => {
                    state.totals_mut().images_failed += 1;
                    format!("Image download error {image_url}: {message}")
                }
            };
            state.log(line);
            Vec::new()
        }
        Msg::PageFailed { page_url, message } => {
            state.log(format!("Page processing error {page_url}: {message}"));
            Vec::new()
        }
        Msg::PageFinished {
            index, skipped, ..
        } => {
            let totals = state.totals_mut();
            totals.pages_done = totals.pages_done.max(index + 1);
            if skipped > 0 {
                state.log(format!("Skipped images: {skipped}"));
            }
            Vec::new()
        }
        Msg::RunFinished { outcome, totals } => {
            match outcome {
                RunEndKind::Completed => {
                    state.finish_run(SessionState::Completed, totals);
                    let line = format!("Download complete: saved {} images", totals.images_saved);
                    state.set_status(line.clone());
                    state.log(line);
                }
                RunEndKind::Stopped => {
                    state.finish_run(SessionState::Stopped, totals);
                    state.set_status("Download stopped");
                    state.log("Download stopped");
                }
                RunEndKind::Failed { reason } => {
                    state.finish_run(SessionState::Failed, totals);
                    state.set_status("Error");
                    state.log(format!("An error occurred: {reason}"));
                }
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn start(state: &mut AppState) -> Vec<Effect> {
    if state.session().is_running() {
        return Vec::new();
    }

    let start_url = state.settings().pukiwiki_url.trim().to_string();
    if start_url.is_empty() {
        state.log("Please enter a URL.");
        return Vec::new();
    }
    if !is_http_url(&start_url) {
        state.log(format!("Invalid URL: {start_url}"));
        return Vec::new();
    }

    let save_path = state.settings().save_path.clone();
    state.begin_run();
    vec![Effect::StartRun {
        start_url,
        save_path,
    }]
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
