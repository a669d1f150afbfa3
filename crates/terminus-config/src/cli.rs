//! Command-line flags for the `terminus` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::{ArbitrationPolicy, Config};

/// Terminus command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terminus", about = "Interactive day/night planet viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,

    /// Directory containing the planet textures.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Cloud opacity arbitration (suspend-oscillator, last-writer-wins).
    #[arg(long)]
    pub arbitration: Option<ArbitrationPolicy>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref title) = args.title {
            self.window.title = title.clone();
        }
        if let Some(ref dir) = args.assets {
            self.assets.dir = dir.clone();
        }
        if let Some(policy) = args.arbitration {
            self.animation.arbitration = policy;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
