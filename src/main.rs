// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-capture")]
#[command(about = "Store color + depth captures with calibration and motion metadata")]
#[command(version)]
struct Cli {
    /// Configuration file (default: <config dir>/depth-capture/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw depth map and store it with its color photo
    Capture(cli::CaptureArgs),

    /// List the captures stored in an object folder
    List {
        /// Object folder to scan
        folder: PathBuf,
    },

    /// Print the metadata embedded in a depth PNG
    Inspect {
        /// Path to a `<prefix>_depthImage.png`
        png: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => depth_capture::Config::load_from(path)?,
        None => depth_capture::Config::load()?,
    };

    match cli.command {
        Commands::Capture(args) => cli::capture(&config, args),
        Commands::List { folder } => cli::list_captures(folder),
        Commands::Inspect { png } => cli::inspect(&png),
        Commands::Config => cli::show_config(&config, cli.config),
    }
}
