use chrono::{DateTime, Local};
use wikigrab_core::{AppViewModel, SessionState};

/// Prefix a log stream line with a wall-clock `[HH:MM:SS]` stamp.
pub fn render_log_line(now: DateTime<Local>, line: &str) -> String {
    format!("[{}] {}", now.format("%H:%M:%S"), line)
}

pub fn render_status(view: &AppViewModel) -> String {
    let session_label = match view.session {
        SessionState::Idle => "Idle",
        SessionState::Listing => "Listing",
        SessionState::ProcessingPages => "Processing",
        SessionState::Completed => "Completed",
        SessionState::Stopped => "Stopped",
        SessionState::Failed => "Failed",
    };
    let totals = &view.totals;
    format!(
        "{} | {} | Pages: {}/{} ({:.0}%) | Saved: {} Skipped: {} Failed: {}",
        session_label,
        view.status,
        totals.pages_done,
        totals.pages_total,
        view.progress_ratio() * 100.0,
        totals.images_saved,
        totals.images_skipped,
        totals.images_failed
    )
}
