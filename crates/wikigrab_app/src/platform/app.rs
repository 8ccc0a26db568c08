use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use engine_logging::{engine_info, engine_warn};
use wikigrab_core::{update, AppState, Msg, SessionState};
use wikigrab_engine::CrawlSettings;

use super::effects::EffectRunner;
use super::persistence::{load_settings, save_settings};
use super::ui::render::{render_log_line, render_status};

const TICK_INTERVAL: Duration = Duration::from_millis(75);

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub url: Option<String>,
    pub save_path: Option<String>,
    pub settings_path: PathBuf,
    pub page_delay: Duration,
    pub max_download_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    Completed,
    Stopped,
    Failed,
}

pub fn run_app(options: AppOptions) -> anyhow::Result<RunExit> {
    let settings = load_settings(&options.settings_path);
    let runner = EffectRunner::new(crawl_settings(&options), options.settings_path.clone())?;
    let mut app = App::new(AppState::with_settings(settings), runner);

    if let Some(url) = options.url {
        app.dispatch(Msg::UrlChanged(url));
    }
    if let Some(save_path) = options.save_path {
        app.dispatch(Msg::SavePathChanged(save_path));
    }

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    spawn_ctrl_c_listener(msg_tx)?;

    app.dispatch(Msg::StartClicked);
    let exit = if app.state.session().is_running() {
        app.run_until_finished(&msg_rx)
    } else {
        RunExit::Failed
    };

    eprintln!("{}", render_status(&app.state.view()));
    save_settings(&options.settings_path, app.state.settings());
    Ok(exit)
}

fn crawl_settings(options: &AppOptions) -> CrawlSettings {
    let mut settings = CrawlSettings {
        page_delay: options.page_delay,
        ..CrawlSettings::default()
    };
    settings.fetch.max_bytes = options.max_download_bytes;
    settings
}

struct App {
    state: AppState,
    runner: EffectRunner,
    last_status: String,
}

impl App {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            last_status: String::new(),
        }
    }

    fn run_until_finished(&mut self, msg_rx: &mpsc::Receiver<Msg>) -> RunExit {
        loop {
            while let Ok(msg) = msg_rx.try_recv() {
                self.dispatch(msg);
            }
            let msg = self.runner.next_msg(TICK_INTERVAL);
            self.dispatch(msg);

            match self.state.session() {
                SessionState::Completed => return RunExit::Completed,
                SessionState::Stopped => return RunExit::Stopped,
                SessionState::Failed => return RunExit::Failed,
                SessionState::Idle | SessionState::Listing | SessionState::ProcessingPages => {}
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        for line in state.take_log() {
            println!("{}", render_log_line(Local::now(), &line));
        }
        if state.consume_dirty() {
            let view = state.view();
            if view.session.is_running() && view.status != self.last_status {
                eprintln!("{}", render_status(&view));
                self.last_status = view.status;
            }
        }

        self.state = state;
        self.runner.run(effects);
    }
}

/// Forward every Ctrl-C as a stop request.
fn spawn_ctrl_c_listener(msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start signal listener")?;

    thread::spawn(move || {
        runtime.block_on(async move {
            loop {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    engine_warn!("Ctrl-C listener stopped: {}", err);
                    break;
                }
                engine_info!("Ctrl-C received; requesting stop");
                if msg_tx.send(Msg::StopClicked).is_err() {
                    break;
                }
            }
        });
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{crawl_settings, AppOptions};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn command_line_limits_reach_the_fetcher() {
        let options = AppOptions {
            url: None,
            save_path: None,
            settings_path: PathBuf::from("settings.toml"),
            page_delay: Duration::from_millis(1200),
            max_download_bytes: 1024 * 1024 * 1024,
        };

        let settings = crawl_settings(&options);

        assert_eq!(settings.page_delay, Duration::from_millis(1200));
        assert_eq!(settings.fetch.max_bytes, 1024 * 1024 * 1024);
    }
}
