mod app;
mod effects;
mod persistence;
mod ui;

pub use app::{run_app, AppOptions, RunExit};
