//! Shotcraft CLI: capture a region, style it, and export it.
//!
//! Usage:
//!   shotcraft capture --frame <PNG> --drag x0,y0,x1,y1   Select, crop, style, save
//!   shotcraft compose <PNG>                              Style an existing image
//!   shotcraft preview <PNG> --padding 10,20,30           Replay slider edits
//!   shotcraft backgrounds                                List the background catalog
//!   shotcraft init                                       Write the default config

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shotcraft_common::config::AppConfig;

mod commands;
mod sinks;

#[derive(Parser)]
#[command(
    name = "shotcraft",
    about = "Region screenshots with rounded corners, backgrounds, and shadows",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a region of a frozen frame, then style and export it
    Capture(commands::capture::CaptureArgs),

    /// Style an existing image and export it
    Compose(commands::compose::ComposeArgs),

    /// Replay a burst of padding edits through the preview scheduler
    Preview(commands::preview::PreviewArgs),

    /// List available backgrounds
    Backgrounds,

    /// Write the default configuration file
    Init {
        /// Destination (defaults to the standard config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    shotcraft_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Capture(args) => commands::capture::run(args, config).await,
        Commands::Compose(args) => commands::compose::run(args, config),
        Commands::Preview(args) => commands::preview::run(args, config).await,
        Commands::Backgrounds => commands::backgrounds::run(&config),
        Commands::Init { output, force } => commands::init::run(output, force),
    }
}
