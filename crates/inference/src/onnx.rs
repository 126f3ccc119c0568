//! Doublet classifier backed by an exported ONNX graph

use crate::batch::DoubletBatch;
use crate::classifier::{scores_from_output, DoubletClassifier, DoubletScore};
use crate::session::create_session;
use crate::InferenceError;
use ort::{session::Session, value::TensorRef};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Graph tensor names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensorNames {
    /// Image input, `[N, 16, 16, 20]`
    pub image_input: String,
    /// Feature input, `[N, 67]`
    pub feature_input: String,
    /// Softmax output, `[N, 2]`
    pub output: String,
}

impl Default for TensorNames {
    fn default() -> Self {
        Self {
            image_input: "hit_shape_input".to_string(),
            feature_input: "info_input".to_string(),
            output: "output/Softmax".to_string(),
        }
    }
}

/// ONNX Runtime doublet classifier
///
/// The session is created once and reused for every batch.
pub struct OnnxDoubletClassifier {
    session: Session,
    names: TensorNames,
}

impl OnnxDoubletClassifier {
    /// Load the model from file
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        names: TensorNames,
        accelerated: bool,
    ) -> Result<Self, InferenceError> {
        let model_path = model_path.as_ref();
        info!("Loading doublet CNN from {}", model_path.display());
        let session = create_session(model_path, accelerated)?;
        Ok(Self { session, names })
    }
}

impl DoubletClassifier for OnnxDoubletClassifier {
    fn classify(&mut self, batch: &DoubletBatch) -> Result<Vec<DoubletScore>, InferenceError> {
        let images = batch.image_tensor()?;
        let features = batch.feature_tensor();

        let image_tensor = TensorRef::from_array_view(images)?;
        let feature_tensor = TensorRef::from_array_view(features)?;

        let outputs = self.session.run(ort::inputs![
            self.names.image_input.as_str() => image_tensor,
            self.names.feature_input.as_str() => feature_tensor,
        ])?;

        let output = outputs
            .get(self.names.output.as_str())
            .ok_or_else(|| InferenceError::MissingOutput(self.names.output.clone()))?;
        let (shape, data) = output.try_extract_tensor::<f32>()?;
        debug!("Doublet CNN output shape: {:?}", shape);

        scores_from_output(shape.as_ref(), data, batch.len())
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
