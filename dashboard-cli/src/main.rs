mod args;
mod commands;
mod confirm;
mod paths;
mod render;
mod session;
mod settings;

use std::fs;
use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::args::Cli;
use crate::settings::MemoryBackend;
use crate::settings::SettingsProvider;
use crate::settings::SqliteBackend;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = open_settings().await;
    match commands::run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to `latest.log` in the cache dir; the previous run's file is archived.
fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = File::create(&path) else { return };

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = WriteLogger::init(level, Config::default(), file);
}

async fn open_settings() -> SettingsProvider {
    if let Some(path) = paths::settings_db() {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        match SqliteBackend::open(&path).await {
            Ok(backend) => return SettingsProvider::new(backend),
            Err(e) => log::warn!(
                "Settings database unavailable at {}: {}; using in-memory settings",
                path.display(),
                e
            ),
        }
    }
    SettingsProvider::new(MemoryBackend::new())
}
