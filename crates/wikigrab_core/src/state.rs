use crate::view_model::AppViewModel;

pub const DEFAULT_PUKIWIKI_URL: &str = "http://localhost/pukiwiki/index.php?cmd=list";
pub const DEFAULT_SAVE_PATH: &str = "./images";

/// User-editable inputs that survive restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub pukiwiki_url: String,
    pub save_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pukiwiki_url: DEFAULT_PUKIWIKI_URL.to_string(),
            save_path: DEFAULT_SAVE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Listing,
    ProcessingPages,
    Completed,
    Stopped,
    Failed,
}

impl SessionState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Listing | Self::ProcessingPages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunTotals {
    pub pages_total: usize,
    pub pages_done: usize,
    pub images_saved: usize,
    pub images_skipped: usize,
    pub images_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: Settings,
    session: SessionState,
    stop_requested: bool,
    totals: RunTotals,
    status: String,
    log: Vec<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            pukiwiki_url: self.settings.pukiwiki_url.clone(),
            save_path: self.settings.save_path.clone(),
            status: self.status.clone(),
            totals: self.totals,
            stop_requested: self.stop_requested,
            can_start: !self.session.is_running(),
            can_stop: self.session.is_running() && !self.stop_requested,
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Returns true if state changed since last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drain log lines appended since the last call, oldest first.
    pub fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    pub(crate) fn set_url(&mut self, url: String) -> bool {
        if self.settings.pukiwiki_url == url {
            return false;
        }
        self.settings.pukiwiki_url = url;
        self.dirty = true;
        true
    }

    pub(crate) fn set_save_path(&mut self, path: String) -> bool {
        if self.settings.save_path == path {
            return false;
        }
        self.settings.save_path = path;
        self.dirty = true;
        true
    }

    pub(crate) fn begin_run(&mut self) {
        self.session = SessionState::Listing;
        self.stop_requested = false;
        self.totals = RunTotals::default();
        self.set_status("Running...");
    }

    pub(crate) fn request_stop(&mut self) {
        self.stop_requested = true;
        self.set_status("Stopping...");
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        if self.session != session {
            self.session = session;
            self.dirty = true;
        }
    }

    pub(crate) fn totals_mut(&mut self) -> &mut RunTotals {
        self.dirty = true;
        &mut self.totals
    }

    pub(crate) fn finish_run(&mut self, session: SessionState, totals: RunTotals) {
        self.session = session;
        self.stop_requested = false;
        self.totals = totals;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.dirty = true;
    }

    pub(crate) fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        self.dirty = true;
    }
}
