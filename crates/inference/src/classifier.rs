//! Classifier seam between batch assembly and the model runtime

use crate::batch::DoubletBatch;
use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// Model output for one doublet: probability of fake, probability of real
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubletScore {
    pub fake: f32,
    pub real: f32,
}

impl DoubletScore {
    #[must_use]
    pub fn new(fake: f32, real: f32) -> Self {
        Self { fake, real }
    }

    /// Whether the model favours a genuine segment
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.real > self.fake
    }
}

/// Anything that scores a batch of doublets
pub trait DoubletClassifier {
    /// One score per doublet, in batch order
    fn classify(&mut self, batch: &DoubletBatch) -> Result<Vec<DoubletScore>, InferenceError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Split a flat `[N, 2]` output into scores, rejecting any other shape
pub fn scores_from_output(
    shape: &[i64],
    data: &[f32],
    expected: usize,
) -> Result<Vec<DoubletScore>, InferenceError> {
    let rows = usize::try_from(shape.first().copied().unwrap_or(-1)).ok();
    let well_formed = shape.len() == 2
        && shape[1] == 2
        && rows == Some(expected)
        && data.len() == expected * 2;
    if !well_formed {
        return Err(InferenceError::OutputShape {
            expected: vec![expected as i64, 2],
            actual: shape.to_vec(),
        });
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| DoubletScore::new(pair[0], pair[1]))
        .collect())
}
