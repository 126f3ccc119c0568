//! Batch assembly and doublet classification via ONNX Runtime
//!
//! Every admitted doublet of a layer-pair group becomes one row of two
//! tensors: a 20-channel stack of 16×16 pads and the 67-value feature
//! vector. The batch is scored by a [`DoubletClassifier`]; the production
//! backend is [`OnnxDoubletClassifier`].
//!
//! # Example
//! ```no_run
//! use doublet_common::DoubletConfig;
//! use doublet_inference::{DoubletBatch, DoubletClassifier, OnnxDoubletClassifier, TensorNames};
//!
//! # fn main() -> Result<(), doublet_inference::InferenceError> {
//! let config = DoubletConfig::default();
//! let mut classifier = OnnxDoubletClassifier::new("doublet_cnn.onnx", TensorNames::default(), false)?;
//!
//! let batch = DoubletBatch::assemble(&config, &[], &[])?;
//! if !batch.is_empty() {
//!     let scores = classifier.classify(&batch)?;
//!     println!("{} scores", scores.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod classifier;
pub mod onnx;
pub mod session;

use thiserror::Error;

pub use batch::DoubletBatch;
pub use classifier::{scores_from_output, DoubletClassifier, DoubletScore};
pub use onnx::{OnnxDoubletClassifier, TensorNames};
pub use session::{create_cpu_session, create_session, OnnxError, THREADS_ENV};

/// Inference errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Failed to load model: {0}")]
    ModelLoad(#[from] OnnxError),

    #[error("Batch assembly error: {0}")]
    BatchMismatch(String),

    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Unexpected output shape: expected {expected:?}, got {actual:?}")]
    OutputShape { expected: Vec<i64>, actual: Vec<i64> },

    #[error("Model output '{0}' not found")]
    MissingOutput(String),

    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InferenceError::OutputShape {
            expected: vec![4, 2],
            actual: vec![4, 3],
        };
        assert_eq!(
            err.to_string(),
            "Unexpected output shape: expected [4, 2], got [4, 3]"
        );
    }

    #[test]
    fn test_default_tensor_names() {
        let names = TensorNames::default();
        assert_eq!(names.image_input, "hit_shape_input");
        assert_eq!(names.feature_input, "info_input");
        assert_eq!(names.output, "output/Softmax");
    }
}
