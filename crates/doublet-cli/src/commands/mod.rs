pub mod inspect;
pub mod run;

use anyhow::{Context as _, Result};
use doublet_pipeline::PipelineConfig;
use std::path::Path;

/// Configuration from `path`, or the defaults when no file is given
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}
