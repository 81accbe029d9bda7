//! Command-line argument parsing for Tessera.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tessera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "tessera", about = "Headless chunk section mesher")]
pub struct CliArgs {
    /// Number of build worker threads.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Maximum number of in-flight section builds.
    #[arg(long)]
    pub budget: Option<usize>,

    /// Radius, in chunk columns, of the area to build.
    #[arg(long)]
    pub view_radius: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Upload finished sections to a headless GPU device instead of memory.
    #[arg(long)]
    pub gpu: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(workers) = args.workers {
            self.meshing.worker_count = workers;
        }
        if let Some(budget) = args.budget {
            self.meshing.task_budget = budget;
        }
        if let Some(radius) = args.view_radius {
            self.world.view_radius = radius;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
