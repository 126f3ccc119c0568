//! Per-hit feature extraction and cross-hit scalars

use crate::pad::Pad;
use crate::selector::{LayerPairIds, SelectedLayerPair};
use doublet_common::{
    DetId, DoubletConfig, TrackerHit, CROSS_FEATURES, HIT_FEATURES, INFO_SIZE, SENTINEL,
};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::warn;

#[inline]
fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Compact features of one hit, in model order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitFeatures {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Azimuth in [0, 2π)
    pub phi: f32,
    pub r: f32,
    /// Sequence number of the hit's layer
    pub det_seq: f32,
    pub is_barrel: f32,
    pub layer: f32,
    pub ladder: f32,
    pub side: f32,
    pub disk: f32,
    pub panel: f32,
    pub module: f32,
    pub is_flipped: f32,
    pub ax1: f32,
    pub ax2: f32,
    pub cluster_x: f32,
    pub cluster_y: f32,
    pub cluster_size: f32,
    pub size_x: f32,
    pub size_y: f32,
    pub pixel_zero: f32,
    pub avg_charge: f32,
    pub overflow_x: f32,
    pub overflow_y: f32,
    pub skew: f32,
    pub is_big: f32,
    pub is_bad: f32,
    pub is_edge: f32,
    pub sum_adc: f32,
}

impl HitFeatures {
    /// All features in model order, as written to the feature tensor
    #[must_use]
    pub fn to_array(&self) -> [f32; HIT_FEATURES] {
        let head = self.head();
        let mut out = [0.0; HIT_FEATURES];
        out[..HIT_FEATURES - 1].copy_from_slice(&head);
        out[HIT_FEATURES - 1] = self.sum_adc;
        out
    }

    /// Everything but the trailing charge sum
    fn head(&self) -> [f32; HIT_FEATURES - 1] {
        [
            self.x,
            self.y,
            self.z,
            self.phi,
            self.r,
            self.det_seq,
            self.is_barrel,
            self.layer,
            self.ladder,
            self.side,
            self.disk,
            self.panel,
            self.module,
            self.is_flipped,
            self.ax1,
            self.ax2,
            self.cluster_x,
            self.cluster_y,
            self.cluster_size,
            self.size_x,
            self.size_y,
            self.pixel_zero,
            self.avg_charge,
            self.overflow_x,
            self.overflow_y,
            self.skew,
            self.is_big,
            self.is_bad,
            self.is_edge,
        ]
    }
}

/// Features and pad of one hit
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedHit {
    pub features: HitFeatures,
    /// Raw, unnormalized pad
    pub pad: Pad,
}

impl EncodedHit {
    /// Uncompressed row for the text log: features with the raw pad inlined before the charge sum
    #[must_use]
    pub fn raw_row(&self) -> Vec<f32> {
        let mut row = Vec::with_capacity(HIT_FEATURES + self.pad.cells().len());
        row.extend_from_slice(&self.features.head());
        row.extend_from_slice(self.pad.cells());
        row.push(self.features.sum_adc);
        row
    }
}

/// Scalars combining both hits, each `outer - inner` unless noted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossFeatures {
    pub delta_size: f32,
    pub delta_charge: f32,
    pub delta_aspect: f32,
    pub delta_r: f32,
    pub delta_phi: f32,
    pub delta_z: f32,
    /// Straight-line extrapolation of the doublet to r = 0
    pub z0: f32,
}

impl CrossFeatures {
    #[must_use]
    pub fn to_array(&self) -> [f32; CROSS_FEATURES] {
        [
            self.delta_size,
            self.delta_charge,
            self.delta_aspect,
            self.delta_r,
            self.delta_phi,
            self.delta_z,
            self.z0,
        ]
    }
}

/// Fully encoded doublet
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDoublet {
    /// Position of the doublet in its layer-pair group
    pub index: usize,
    pub layer_ids: LayerPairIds,
    pub inner: EncodedHit,
    pub outer: EncodedHit,
    pub cross: CrossFeatures,
    /// z0 was not finite and was replaced by the sentinel
    pub z0_fault: bool,
}

impl EncodedDoublet {
    /// Write the 67 model features into `out`
    pub fn write_features(&self, out: &mut [f32]) {
        out[..HIT_FEATURES].copy_from_slice(&self.inner.features.to_array());
        out[HIT_FEATURES..2 * HIT_FEATURES].copy_from_slice(&self.outer.features.to_array());
        out[2 * HIT_FEATURES..INFO_SIZE].copy_from_slice(&self.cross.to_array());
    }

    /// The 67 model features
    #[must_use]
    pub fn feature_vector(&self) -> Vec<f32> {
        let mut out = vec![0.0; INFO_SIZE];
        self.write_features(&mut out);
        out
    }
}

/// Builds features and pads from hits
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'c> {
    config: &'c DoubletConfig,
}

impl<'c> FeatureEncoder<'c> {
    #[must_use]
    pub fn new(config: &'c DoubletConfig) -> Self {
        Self { config }
    }

    /// Encode one hit measured on the layer with sequence number `det_seq`
    #[must_use]
    pub fn encode_hit<H: TrackerHit>(&self, hit: &H, det_seq: u32) -> EncodedHit {
        let position = hit.global_position();
        let cluster = hit.cluster();
        let pad_size = self.config.pad_size();

        let (is_barrel, layer, ladder, side, disk, panel, module) = match hit.geographical_id() {
            DetId::Barrel {
                layer,
                ladder,
                module,
            } => (
                1.0,
                layer as f32,
                ladder as f32,
                SENTINEL,
                SENTINEL,
                SENTINEL,
                module as f32,
            ),
            DetId::Forward {
                side,
                disk,
                panel,
                module,
            } => (
                0.0,
                SENTINEL,
                SENTINEL,
                side as f32,
                disk as f32,
                panel as f32,
                module as f32,
            ),
            // Non-pixel hits never pass the selector; keep the layout fixed regardless
            DetId::Other { .. } => (
                0.0, SENTINEL, SENTINEL, SENTINEL, SENTINEL, SENTINEL, SENTINEL,
            ),
        };

        let surface = hit.surface();
        let ax1 = surface.to_global([0.0, 0.0, 0.0]).perp();
        let ax2 = surface.to_global([0.0, 0.0, 1.0]).perp();

        let features = HitFeatures {
            x: position.x,
            y: position.y,
            z: position.z,
            phi: normalize_phi(hit.phi()),
            r: hit.r(),
            det_seq: det_seq as f32,
            is_barrel,
            layer,
            ladder,
            side,
            disk,
            panel,
            module,
            is_flipped: flag(ax1 < ax2),
            ax1,
            ax2,
            cluster_x: cluster.x,
            cluster_y: cluster.y,
            cluster_size: cluster.size() as f32,
            size_x: f32::from(cluster.size_x),
            size_y: f32::from(cluster.size_y),
            pixel_zero: cluster.first_adc(),
            avg_charge: cluster.average_charge(),
            overflow_x: flag(usize::from(cluster.size_x) > pad_size),
            overflow_y: flag(usize::from(cluster.size_y) > pad_size),
            skew: cluster.aspect(),
            is_big: flag(cluster.spans_two_rocs),
            is_bad: flag(cluster.has_bad_pixels),
            is_edge: flag(cluster.is_on_edge),
            sum_adc: cluster.charge as f32,
        };

        EncodedHit {
            features,
            pad: Pad::from_cluster(cluster, self.config),
        }
    }

    /// Encode both hits of a doublet and derive the cross-hit scalars
    #[must_use]
    pub fn encode_doublet<H: TrackerHit>(
        &self,
        index: usize,
        layer_ids: LayerPairIds,
        (inner, inner_seq): (&H, u32),
        (outer, outer_seq): (&H, u32),
    ) -> EncodedDoublet {
        let inner_hit = self.encode_hit(inner, inner_seq);
        let outer_hit = self.encode_hit(outer, outer_seq);
        let (cross, z0_fault) = self.cross_features(&inner_hit.features, &outer_hit.features);

        if z0_fault {
            warn!(
                "Doublet {}: non-finite z0 (delta r = {}), using sentinel",
                index, cross.delta_r
            );
        }

        EncodedDoublet {
            index,
            layer_ids,
            inner: inner_hit,
            outer: outer_hit,
            cross,
            z0_fault,
        }
    }

    /// Encode every admitted doublet of a layer pair, in group order
    #[must_use]
    pub fn encode_layer_pair(&self, selected: &SelectedLayerPair<'_>) -> Vec<EncodedDoublet> {
        selected
            .doublets
            .iter()
            .map(|d| {
                self.encode_doublet(
                    d.index,
                    selected.ids,
                    (d.inner, selected.inner_layer.seq_num),
                    (d.outer, selected.outer_layer.seq_num),
                )
            })
            .collect()
    }

    fn cross_features(&self, inner: &HitFeatures, outer: &HitFeatures) -> (CrossFeatures, bool) {
        let delta_r = outer.r - inner.r;
        let delta_phi = self
            .config
            .delta_phi_rule
            .apply(f64::from(outer.phi - inner.phi)) as f32;
        let delta_z = if self.config.measured_delta_z {
            outer.z - inner.z
        } else {
            0.0
        };

        let z0 = inner.z - inner.r * (delta_z / delta_r);
        let z0_fault = !z0.is_finite();

        let cross = CrossFeatures {
            delta_size: outer.cluster_size - inner.cluster_size,
            delta_charge: outer.sum_adc - inner.sum_adc,
            delta_aspect: outer.skew - inner.skew,
            delta_r,
            delta_phi,
            delta_z,
            z0: if z0_fault { SENTINEL } else { z0 },
        };
        (cross, z0_fault)
    }
}

/// Map an azimuth in (-π, π] to [0, 2π)
#[must_use]
pub fn normalize_phi(phi: f32) -> f32 {
    if phi >= 0.0 {
        phi
    } else {
        (2.0 * PI + f64::from(phi)) as f32
    }
}
