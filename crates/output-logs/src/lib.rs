//! Output sinks for encoded and scored doublets
//!
//! [`EventTextLogs`] writes the three per-event tab-separated logs;
//! [`RunRecordStream`] writes one JSON object per doublet to a per-run file.

pub mod jsonl;
pub mod record;
pub mod text;

use doublet_inference::DoubletScore;
use std::path::PathBuf;
use thiserror::Error;

pub use jsonl::{run_stream_path, DoubletLine, RunRecordStream};
pub use record::{DoubletRecord, EventHeader};
pub use text::{EventLogPaths, EventTextLogs};

/// Output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for doublet rows
pub trait DoubletSink {
    /// Called once per doublet before the group is scored
    fn write_inputs(&mut self, record: &DoubletRecord<'_>) -> Result<(), OutputError>;

    /// Called once per doublet with its score, in batch order
    fn write_score(
        &mut self,
        record: &DoubletRecord<'_>,
        score: &DoubletScore,
    ) -> Result<(), OutputError>;

    /// Flush buffered rows
    fn finish(&mut self) -> Result<(), OutputError>;
}
