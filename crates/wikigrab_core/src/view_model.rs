use crate::{RunTotals, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub pukiwiki_url: String,
    pub save_path: String,
    pub status: String,
    pub totals: RunTotals,
    pub stop_requested: bool,
    pub can_start: bool,
    pub can_stop: bool,
    pub dirty: bool,
}

impl AppViewModel {
    /// Fraction of listed pages processed so far, in `0.0..=1.0`.
    pub fn progress_ratio(&self) -> f64 {
        let RunTotals {
            pages_total,
            pages_done,
            ..
        } = self.totals;
        if pages_total == 0 {
            return if self.session == SessionState::Completed {
                1.0
            } else {
                0.0
            };
        }
        (pages_done as f64 / pages_total as f64).clamp(0.0, 1.0)
    }
}
