//! Doublet CNN CLI
//!
//! Runs recorded pixel doublets through the CNN filter and writes the
//! per-doublet training and inference logs.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::inspect::InspectCommand;
use commands::run::RunCommand;

#[derive(Parser)]
#[command(
    name = "doublet-cnn",
    version,
    about = "Pixel doublet encoding and CNN scoring",
    after_help = "EXAMPLES:\n  \
                  # Score two events with an exported model\n  \
                  doublet-cnn run --model models/doublet_cnn.onnx event_1.json event_2.json\n\n  \
                  # One JSON-lines file per run instead of per-event text logs\n  \
                  doublet-cnn run --model models/doublet_cnn.onnx --format jsonl events/*.json\n\n  \
                  # Selection and truth counts only, no model needed\n  \
                  doublet-cnn inspect --config doublets.yaml event_1.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode, label and score doublets, writing the logs
    Run(RunCommand),

    /// Print per-group selection and truth counts without inference
    Inspect(InspectCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        // stdout carries the inspect summaries
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Run(cmd) => cmd.execute(),
        Commands::Inspect(cmd) => cmd.execute(),
    }
}
