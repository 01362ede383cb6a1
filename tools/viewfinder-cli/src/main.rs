//! Viewfinder CLI — Command-line interface for capture and recording.
//!
//! Usage:
//!   viewfinder record [OPTIONS]   Start capturing and recording
//!   viewfinder devices            List capture devices
//!   viewfinder config [--write]   Show or persist the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "viewfinder",
    about = "Camera/microphone capture with live preview and front/back toggle",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start capturing and recording to the fixed destination path
    Record {
        /// Destination file (defaults to the configured recordings dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop automatically after this many seconds (Ctrl+C otherwise)
        #[arg(long)]
        duration: Option<u64>,

        /// Toggle front/back camera once after this many seconds
        #[arg(long)]
        switch_after: Option<u64>,

        /// Start on the back camera instead of the front
        #[arg(long)]
        back: bool,

        /// Disable video stabilization
        #[arg(long)]
        no_stabilization: bool,
    },

    /// List capture devices
    Devices,

    /// Show the effective configuration, optionally writing it to disk
    Config {
        /// Write the configuration file to the standard location
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from the configured settings; --verbose overrides the level.
    let mut logging = viewfinder_common::config::AppConfig::load().logging;
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    viewfinder_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Record {
            output,
            duration,
            switch_after,
            back,
            no_stabilization,
        } => {
            commands::record::run(output, duration, switch_after, back, !no_stabilization).await
        }
        Commands::Devices => commands::devices::run(),
        Commands::Config { write } => commands::config::run(write),
    }
}
