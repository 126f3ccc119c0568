//! Packing of one layer-pair group into model tensors

use crate::InferenceError;
use doublet_common::{DoubletConfig, INFO_SIZE};
use doublet_features::{EncodedDoublet, LayerPairIds};
use ndarray::{Array2, ArrayView2, ArrayView4};

/// Image and feature tensors of one layer-pair group
///
/// Image row `d` holds `channels × pad_area` values. Channel `c` of that row
/// is the contiguous range `[c·pad_area, (c+1)·pad_area)`; the inner pad goes
/// to channel `inner_id`, the outer pad to `cnn_layers + outer_id`.
#[derive(Debug, Clone)]
pub struct DoubletBatch {
    images: Array2<f32>,
    features: Array2<f32>,
    labels: Vec<f32>,
    pad_size: usize,
    channels: usize,
}

impl DoubletBatch {
    /// Fill the tensors from encoded doublets and their labels
    pub fn assemble(
        config: &DoubletConfig,
        doublets: &[EncodedDoublet],
        labels: &[f32],
    ) -> Result<Self, InferenceError> {
        if doublets.len() != labels.len() {
            return Err(InferenceError::BatchMismatch(format!(
                "{} doublets but {} labels",
                doublets.len(),
                labels.len()
            )));
        }

        let n = doublets.len();
        let area = config.pad_area();
        let mut images = Array2::<f32>::zeros((n, config.image_stride()));
        let mut features = Array2::<f32>::zeros((n, INFO_SIZE));

        for (d, doublet) in doublets.iter().enumerate() {
            let LayerPairIds { inner, outer } = doublet.layer_ids;
            let channels = [
                (inner, &doublet.inner.pad),
                (config.cnn_layers() + outer, &doublet.outer.pad),
            ];

            let mut image_row = images.row_mut(d);
            let image = image_row.as_slice_mut().ok_or_else(|| {
                InferenceError::BatchMismatch("image storage is not contiguous".to_string())
            })?;
            for (channel, pad) in channels {
                let start = channel * area;
                let slot = image.get_mut(start..start + area).ok_or_else(|| {
                    InferenceError::BatchMismatch(format!(
                        "channel {channel} outside the {}-channel stack",
                        config.channels()
                    ))
                })?;
                pad.write_normalized(config, slot);
            }

            let mut feature_row = features.row_mut(d);
            let info = feature_row.as_slice_mut().ok_or_else(|| {
                InferenceError::BatchMismatch("feature storage is not contiguous".to_string())
            })?;
            doublet.write_features(info);
        }

        Ok(Self {
            images,
            features,
            labels: labels.to_vec(),
            pad_size: config.pad_size(),
            channels: config.channels(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Image storage viewed as `[N, pad, pad, channels]`, the shape the model is fed
    ///
    /// The flat buffer is reinterpreted, not transposed.
    pub fn image_tensor(&self) -> Result<ArrayView4<'_, f32>, InferenceError> {
        let shape = (self.len(), self.pad_size, self.pad_size, self.channels);
        Ok(self.images.view().into_shape_with_order(shape)?)
    }

    /// Feature storage as `[N, 67]`
    #[must_use]
    pub fn feature_tensor(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Flat image values of doublet `d`
    #[must_use]
    pub fn image_slice(&self, d: usize) -> Option<&[f32]> {
        (d < self.len()).then(|| self.images.row(d).to_slice()).flatten()
    }

    /// Feature values of doublet `d`
    #[must_use]
    pub fn feature_slice(&self, d: usize) -> Option<&[f32]> {
        (d < self.len()).then(|| self.features.row(d).to_slice()).flatten()
    }

    /// Pad stored in `channel` of doublet `d`
    #[must_use]
    pub fn channel(&self, d: usize, channel: usize) -> Option<&[f32]> {
        let area = self.pad_size * self.pad_size;
        self.image_slice(d)?.get(channel * area..(channel + 1) * area)
    }
}
