//! The `terminus` binary: an interactive day/night planet.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags, e.g. `terminus --width 1920 --height 1080 --assets ./earth`.

use std::process::ExitCode;

use clap::Parser;
use terminus_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map(Ok).unwrap_or_else(default_config_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terminus_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        "Terminus starting: assets from {}, arbitration {:?}",
        config.assets.dir.display(),
        config.animation.arbitration
    );

    match terminus_app::window::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}
