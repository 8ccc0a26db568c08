//! Wikigrab core: pure state machine and view-model helpers for the crawl
//! control surface.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{ImageResultKind, Msg, RunEndKind};
pub use state::{AppState, RunTotals, SessionState, Settings, DEFAULT_PUKIWIKI_URL, DEFAULT_SAVE_PATH};
pub use update::update;
pub use view_model::AppViewModel;
