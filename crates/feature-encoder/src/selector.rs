//! Pixel-only selection of layer pairs and doublets

use doublet_common::{
    DetLayer, DoubletConfig, HasGeographicalId, HitRole, LayerPairDoublets, PixelHit,
};
use serde::Serialize;
use tracing::debug;

/// Dense channel indices of an admitted layer pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerPairIds {
    pub inner: usize,
    pub outer: usize,
}

/// Doublet that passed the pixel-only guard
#[derive(Debug, Clone, Copy)]
pub struct SelectedDoublet<'a> {
    /// Position of the doublet in its layer-pair group
    pub index: usize,
    pub inner: &'a PixelHit,
    pub outer: &'a PixelHit,
}

/// Admitted doublets of one layer-pair group
#[derive(Debug, Clone)]
pub struct SelectedLayerPair<'a> {
    pub inner_layer: DetLayer,
    pub outer_layer: DetLayer,
    pub ids: LayerPairIds,
    pub doublets: Vec<SelectedDoublet<'a>>,
    /// Doublets dropped by the per-doublet guard
    pub rejected: usize,
}

impl SelectedLayerPair<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.doublets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doublets.is_empty()
    }
}

/// Filters layer pairs and doublets down to the pixel detector
#[derive(Debug, Clone, Copy)]
pub struct DoubletSelector<'c> {
    config: &'c DoubletConfig,
}

impl<'c> DoubletSelector<'c> {
    #[must_use]
    pub fn new(config: &'c DoubletConfig) -> Self {
        Self { config }
    }

    /// Dense indices of both layers, `None` unless both are pixel layers
    #[must_use]
    pub fn layer_ids(&self, inner: DetLayer, outer: DetLayer) -> Option<LayerPairIds> {
        let inner = self.config.dense_layer_index(inner.seq_num)?;
        let outer = self.config.dense_layer_index(outer.seq_num)?;
        Some(LayerPairIds { inner, outer })
    }

    /// Both hits must sit on pixel barrel or pixel forward modules
    #[must_use]
    pub fn admits<H: HasGeographicalId>(inner: &H, outer: &H) -> bool {
        inner.geographical_id().is_pixel() && outer.geographical_id().is_pixel()
    }

    /// Apply both filters to a layer-pair group
    ///
    /// Returns `None` when the group is not a pixel layer pair. Doublets whose
    /// hit indices do not resolve are dropped like non-pixel doublets.
    #[must_use]
    pub fn select<'a>(&self, group: &'a LayerPairDoublets) -> Option<SelectedLayerPair<'a>> {
        let Some(ids) = self.layer_ids(group.inner_layer, group.outer_layer) else {
            debug!(
                "Skipping layer pair ({}, {}): not a pixel layer pair",
                group.inner_layer.seq_num, group.outer_layer.seq_num
            );
            return None;
        };

        let mut doublets = Vec::with_capacity(group.len());
        let mut rejected = 0;

        for index in 0..group.len() {
            let hits = (
                group.hit(index, HitRole::Inner),
                group.hit(index, HitRole::Outer),
            );
            match hits {
                (Some(inner), Some(outer)) if Self::admits(inner, outer) => {
                    doublets.push(SelectedDoublet {
                        index,
                        inner,
                        outer,
                    });
                }
                _ => rejected += 1,
            }
        }

        if rejected > 0 {
            debug!(
                "Layer pair ({}, {}): dropped {} of {} doublets",
                group.inner_layer.seq_num,
                group.outer_layer.seq_num,
                rejected,
                group.len()
            );
        }

        Some(SelectedLayerPair {
            inner_layer: group.inner_layer,
            outer_layer: group.outer_layer,
            ids,
            doublets,
            rejected,
        })
    }
}
