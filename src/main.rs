use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use alacritheme::cli::{Cli, Settings};
use alacritheme::live_config::{self, ConfigBackup};
use alacritheme::tui::{self, Exit};
use alacritheme::{logging, signals};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    Cli::parse();
    logging::init();
    let settings = Settings::from_env()?;
    tracing::info!(
        themes_dir = %settings.themes_dir.display(),
        config_file = %settings.config_file.display(),
        "starting"
    );

    live_config::ensure_exists(&settings.config_file)?;
    let backup = ConfigBackup::capture(&settings.config_file)?;
    signals::install()?;

    match panic::catch_unwind(AssertUnwindSafe(|| tui::run(&settings))) {
        Ok(Ok(Exit::Keep)) => Ok(()),
        Ok(Ok(Exit::Restore)) => backup.restore(),
        Ok(Err(err)) => {
            // restore even when the UI failed
            restore_or_report(&backup);
            Err(err)
        }
        Err(payload) => {
            restore_or_report(&backup);
            panic::resume_unwind(payload)
        }
    }
}

fn restore_or_report(backup: &ConfigBackup) {
    if let Err(err) = backup.restore() {
        tracing::error!("{err:#}");
        eprintln!("error: {err:#}");
    }
}
