//! Selection and truth counts without a model

use super::load_config;
use anyhow::{Context as _, Result};
use clap::Args;
use doublet_pipeline::{inspect_event, load_event};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectCommand {
    /// Event files (JSON)
    #[arg(value_name = "EVENT_JSON", required = true)]
    events: Vec<PathBuf>,

    /// YAML pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl InspectCommand {
    pub fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        for path in &self.events {
            let event = load_event(path)
                .with_context(|| format!("Failed to read event {}", path.display()))?;
            let summary = inspect_event(&config.doublets, &event);
            serde_json::to_writer(&mut out, &summary).context("Failed to write summary")?;
            writeln!(out)?;
        }
        Ok(())
    }
}
