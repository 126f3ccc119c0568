//! Full pipeline: selection, encoding, labels, inference and logs

use super::load_config;
use anyhow::{Context as _, Result};
use clap::Args;
use doublet_inference::OnnxDoubletClassifier;
use doublet_pipeline::{load_event, EventProcessor, OutputFormat};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct RunCommand {
    /// Event files (JSON)
    #[arg(value_name = "EVENT_JSON", required = true)]
    events: Vec<PathBuf>,

    /// Exported doublet CNN; overrides `model_path` from the config
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// YAML pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Process name used in output file names
    #[arg(long)]
    process_name: Option<String>,

    /// Output directory for the logs
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output format: text or jsonl
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Try CUDA before the CPU execution provider
    #[arg(long)]
    accelerated: bool,
}

impl RunCommand {
    pub fn execute(self) -> Result<()> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(name) = self.process_name {
            config.process_name = name;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(model) = self.model {
            config.model_path = Some(model);
        }
        config.accelerated |= self.accelerated;

        let Some(model_path) = config.model_path.clone() else {
            anyhow::bail!("No model given: pass --model or set model_path in the config");
        };

        info!("Output directory: {}", config.output_dir.display());
        info!("Output format: {:?}", config.output_format);

        let classifier = OnnxDoubletClassifier::new(
            &model_path,
            config.tensor_names.clone(),
            config.accelerated,
        )
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;

        let mut processor =
            EventProcessor::new(config, classifier).context("Invalid pipeline configuration")?;

        let mut admitted = 0;
        let mut predicted_real = 0;
        for path in &self.events {
            let event = load_event(path)
                .with_context(|| format!("Failed to read event {}", path.display()))?;
            let summary = processor
                .process_event(&event)
                .with_context(|| format!("Failed to process event {}", path.display()))?;
            admitted += summary.admitted();
            predicted_real += summary.predicted_real();
        }
        processor.finish().context("Failed to close output")?;

        info!(
            "Processed {} events: {} doublets scored, {} predicted real",
            self.events.len(),
            admitted,
            predicted_real
        );
        Ok(())
    }
}
