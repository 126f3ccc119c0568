//! Fixed-length truth records attached to every doublet

use doublet_common::{TrackingParticle, SENTINEL, TRUTH_BLOCK, TRUTH_HEADER, TRUTH_PARAMS};
use serde::Serialize;

/// Identity and kinematics of one tracking particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParticleBlock([f32; TRUTH_PARAMS]);

impl ParticleBlock {
    /// Block for a side without any associated particle
    #[must_use]
    pub fn missing() -> Self {
        Self([SENTINEL; TRUTH_PARAMS])
    }

    /// Describe the particle stored under `key`
    #[must_use]
    pub fn from_particle(key: u32, particle: &TrackingParticle) -> Self {
        let m = &particle.momentum;
        let v = &particle.vertex;
        let values: [f64; TRUTH_PARAMS] = [
            1.0,
            f64::from(key),
            m.px,
            m.py,
            m.pz,
            m.pt(),
            m.mt(),
            m.et(),
            m.mass_sqr(),
            f64::from(particle.pdg_id),
            f64::from(particle.charge),
            f64::from(particle.n_tracker_hits),
            f64::from(particle.n_tracker_layers),
            m.phi(),
            m.eta(),
            m.rapidity(),
            v.x,
            v.y,
            v.z,
            particle.dxy(),
            particle.dz(),
            f64::from(particle.bunch_crossing),
            // Padding shared with the reconstructed-track layout
            1.0,
            1.0,
            1.0,
            1.0,
        ];
        Self(values.map(|x| x as f32))
    }

    #[must_use]
    pub fn values(&self) -> &[f32; TRUTH_PARAMS] {
        &self.0
    }

    /// Whether the block describes a particle
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.0[0] == 1.0
    }
}

/// Header plus one particle block per hit role
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TruthBlock {
    /// `[1, shared particles, species mask]`, or all sentinels when unmatched
    pub header: [f32; TRUTH_HEADER],
    pub inner: ParticleBlock,
    pub outer: ParticleBlock,
}

impl TruthBlock {
    /// Flattened 55 values in output order
    #[must_use]
    pub fn to_array(&self) -> [f32; TRUTH_BLOCK] {
        let mut out = [0.0; TRUTH_BLOCK];
        out[..TRUTH_HEADER].copy_from_slice(&self.header);
        out[TRUTH_HEADER..TRUTH_HEADER + TRUTH_PARAMS].copy_from_slice(self.inner.values());
        out[TRUTH_HEADER + TRUTH_PARAMS..].copy_from_slice(self.outer.values());
        out
    }
}
