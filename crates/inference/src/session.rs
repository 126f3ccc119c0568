//! ONNX Runtime session creation
//!
//! Sessions use full graph optimization and one intra-op thread per physical
//! core unless `DOUBLET_CNN_THREADS` says otherwise.

use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::debug;

/// Environment variable overriding the intra-op thread count
pub const THREADS_ENV: &str = "DOUBLET_CNN_THREADS";

/// Error type for ONNX session setup
#[derive(Debug, thiserror::Error)]
pub enum OnnxError {
    #[error("Failed to create session builder: {0}")]
    SessionBuilderError(String),

    #[error("Failed to load ONNX model from {path}: {error}")]
    ModelLoadError { path: String, error: String },

    #[error("Model file not found: {0}")]
    ModelNotFound(String),
}

fn intra_threads() -> usize {
    std::env::var(THREADS_ENV)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(num_cpus::get_physical)
}

/// Create a session on the CPU execution provider
pub fn create_cpu_session(model_path: &Path) -> Result<Session, OnnxError> {
    create_session(model_path, false)
}

/// Create a session, trying CUDA before the CPU when `accelerated` is set
pub fn create_session(model_path: &Path, accelerated: bool) -> Result<Session, OnnxError> {
    if !model_path.exists() {
        return Err(OnnxError::ModelNotFound(model_path.display().to_string()));
    }

    let num_threads = intra_threads();
    debug!(
        "Creating ONNX session for {} ({} threads, accelerated: {})",
        model_path.display(),
        num_threads,
        accelerated
    );

    let providers = if accelerated {
        vec![
            CUDAExecutionProvider::default().build(),
            CPUExecutionProvider::default().build(),
        ]
    } else {
        vec![CPUExecutionProvider::default().build()]
    };

    Session::builder()
        .map_err(|e| OnnxError::SessionBuilderError(e.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| OnnxError::SessionBuilderError(e.to_string()))?
        .with_intra_threads(num_threads)
        .map_err(|e| OnnxError::SessionBuilderError(e.to_string()))?
        .with_memory_pattern(true)
        .map_err(|e| OnnxError::SessionBuilderError(e.to_string()))?
        .with_execution_providers(providers)
        .map_err(|e| OnnxError::SessionBuilderError(e.to_string()))?
        .commit_from_file(model_path)
        .map_err(|e| OnnxError::ModelLoadError {
            path: model_path.display().to_string(),
            error: e.to_string(),
        })
}
