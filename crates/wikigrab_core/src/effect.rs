use crate::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Begin a crawl of `start_url`, saving images under `save_path`.
    StartRun { start_url: String, save_path: String },
    /// Request cooperative cancellation of the active run.
    StopRun,
    /// Write the current settings to disk.
    PersistSettings(Settings),
}
