//! Common types and utilities for pixel doublet encoding
pub mod config;
pub mod event;
pub mod hit;
pub mod truth;

pub use config::{ConfigError, DeltaPhiRule, DoubletConfig};
pub use event::{
    in_time_pileup, BeamSpot, DetLayer, EventId, EventInput, HitDoublet, HitRole,
    LayerPairDoublets, PileupSummary,
};
pub use hit::{
    Cluster, ClusterRef, DetId, GlobalPoint, HasCluster, HasGeographicalId, ModuleSurface, Pixel,
    PixelHit, TrackerHit,
};
pub use truth::{ClusterLink, FourMomentum, TrackingParticle, TruthAssociation, Vertex};

/// Value written for every field that has no meaningful content
pub const SENTINEL: f32 = -1.0;

/// Literal appended to every row of the text logs
pub const RECORD_TERMINATOR: f64 = 542.1369;

/// Compact features contributed by one hit
pub const HIT_FEATURES: usize = 30;

/// Scalars derived from both hits of a doublet
pub const CROSS_FEATURES: usize = 7;

/// Length of the per-doublet feature vector fed to the model
pub const INFO_SIZE: usize = 2 * HIT_FEATURES + CROSS_FEATURES;

/// Fields describing one truth particle
pub const TRUTH_PARAMS: usize = 26;

/// Leading summary fields of a truth block
pub const TRUTH_HEADER: usize = 3;

/// Length of the truth block attached to every doublet
pub const TRUTH_BLOCK: usize = TRUTH_HEADER + 2 * TRUTH_PARAMS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(INFO_SIZE, 67);
        assert_eq!(TRUTH_BLOCK, 55);
    }
}
