use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;

mod platform;

use platform::{AppOptions, RunExit};

const LOG_FILE: &str = "./wikigrab.log";

/// Download every image attached to the pages of a Pukiwiki site.
#[derive(Debug, Parser)]
#[command(name = "wikigrab", version)]
#[command(about = "Pukiwiki image downloader", long_about = None)]
struct Cli {
    /// Page-list URL of the wiki, e.g. `http://host/pukiwiki/index.php?cmd=list`.
    /// Defaults to the last URL used.
    #[arg(long)]
    url: Option<String>,

    /// Destination folder for downloaded images. Defaults to the last folder used.
    #[arg(long)]
    save_path: Option<String>,

    /// Settings file that remembers the URL and destination between runs.
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    /// Pause between page fetches, in milliseconds.
    #[arg(long, default_value_t = 500)]
    page_delay_ms: u64,

    /// Largest response accepted, in MiB. Bigger images are reported as
    /// failed downloads.
    #[arg(long, default_value_t = 256)]
    max_download_mb: u64,

    /// Also write diagnostic logs to the terminal, at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (destination, level) = if cli.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    engine_logging::initialize(destination, level, Path::new(LOG_FILE));

    let options = AppOptions {
        url: cli.url,
        save_path: cli.save_path,
        settings_path: cli.settings,
        page_delay: Duration::from_millis(cli.page_delay_ms),
        max_download_bytes: cli.max_download_mb.saturating_mul(1024 * 1024),
    };

    match platform::run_app(options) {
        Ok(RunExit::Completed) => ExitCode::SUCCESS,
        Ok(RunExit::Stopped) => ExitCode::from(130),
        Ok(RunExit::Failed) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("wikigrab error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
