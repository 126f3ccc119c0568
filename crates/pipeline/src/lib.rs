//! Per-event orchestration of the doublet CNN filter
//!
//! For each event, every layer-pair group goes through selection, encoding
//! and truth matching; the admitted doublets are scored as one batch and
//! written to the configured output. Groups and events are processed
//! sequentially in input order.

pub mod config;
pub mod processor;
pub mod summary;

use doublet_common::{ConfigError, EventInput};
use doublet_inference::InferenceError;
use doublet_output::OutputError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use config::{OutputFormat, PipelineConfig};
pub use processor::{inspect_event, prepare_group, EventProcessor, PreparedGroup};
pub use summary::{EventSummary, GroupSummary};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Failed to decode event {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read one event from a JSON file
pub fn load_event(path: impl AsRef<Path>) -> Result<EventInput, PipelineError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| PipelineError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
