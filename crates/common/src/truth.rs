//! Simulated particles and the cluster-to-particle association

use crate::hit::ClusterRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Four-momentum (px, py, pz, E) in GeV
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourMomentum {
    #[must_use]
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Transverse momentum squared
    #[must_use]
    pub fn perp2(&self) -> f64 {
        self.px * self.px + self.py * self.py
    }

    /// Transverse momentum: p_T = √(p_x² + p_y²)
    #[must_use]
    pub fn pt(&self) -> f64 {
        self.perp2().sqrt()
    }

    /// 3-momentum magnitude
    #[must_use]
    pub fn p(&self) -> f64 {
        (self.perp2() + self.pz * self.pz).sqrt()
    }

    /// Azimuthal angle of the momentum
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }

    /// Invariant mass squared: m² = E² - |p|²
    #[must_use]
    pub fn mass_sqr(&self) -> f64 {
        self.e * self.e - self.perp2() - self.pz * self.pz
    }

    /// Transverse mass √(E² - p_z²), negative for spacelike values
    #[must_use]
    pub fn mt(&self) -> f64 {
        let mt2 = self.e * self.e - self.pz * self.pz;
        if mt2 < 0.0 {
            -(-mt2).sqrt()
        } else {
            mt2.sqrt()
        }
    }

    /// Transverse energy E·p_T/|p|
    #[must_use]
    pub fn et(&self) -> f64 {
        let p = self.p();
        if p == 0.0 {
            0.0
        } else {
            self.e * self.pt() / p
        }
    }

    /// Pseudorapidity, with a large finite value along the beam axis
    #[must_use]
    pub fn eta(&self) -> f64 {
        const ETA_MAX: f64 = 22756.0;
        let pt = self.pt();
        if pt > 0.0 {
            (self.pz / pt).asinh()
        } else if self.pz == 0.0 {
            0.0
        } else if self.pz > 0.0 {
            self.pz + ETA_MAX
        } else {
            self.pz - ETA_MAX
        }
    }

    /// Rapidity y = 0.5 · ln((E + p_z) / (E - p_z))
    #[must_use]
    pub fn rapidity(&self) -> f64 {
        0.5 * ((self.e + self.pz) / (self.e - self.pz)).ln()
    }
}

/// Production vertex in cm
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Simulated particle that left hits in the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingParticle {
    pub pdg_id: i32,
    pub charge: i32,
    pub momentum: FourMomentum,
    pub vertex: Vertex,
    pub n_tracker_hits: u32,
    pub n_tracker_layers: u32,
    #[serde(default)]
    pub bunch_crossing: i32,
}

impl TrackingParticle {
    /// Transverse impact parameter with respect to the origin
    #[must_use]
    pub fn dxy(&self) -> f64 {
        let phi = self.momentum.phi();
        -self.vertex.x * phi.sin() + self.vertex.y * phi.cos()
    }

    /// Longitudinal impact parameter with respect to the origin
    #[must_use]
    pub fn dz(&self) -> f64 {
        let m = &self.momentum;
        let pt = m.perp2().sqrt();
        self.vertex.z - (self.vertex.x * m.px + self.vertex.y * m.py) / pt * m.pz / pt
    }
}

/// One cluster-to-particle link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLink {
    pub cluster: ClusterRef,
    pub particle: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AssociationTable {
    #[serde(default)]
    particles: Vec<TrackingParticle>,
    #[serde(default)]
    links: Vec<ClusterLink>,
}

/// Tracking particles plus the clusters each one is associated with
///
/// A particle's key is its index in the particle collection. Lookups return
/// links in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "AssociationTable", into = "AssociationTable")]
pub struct TruthAssociation {
    particles: Vec<TrackingParticle>,
    links: Vec<ClusterLink>,
    by_cluster: HashMap<ClusterRef, Vec<u32>>,
}

impl From<AssociationTable> for TruthAssociation {
    fn from(table: AssociationTable) -> Self {
        let mut association = TruthAssociation {
            particles: table.particles,
            ..Default::default()
        };
        for link in table.links {
            association.associate(link.cluster, link.particle);
        }
        association
    }
}

impl From<TruthAssociation> for AssociationTable {
    fn from(association: TruthAssociation) -> Self {
        AssociationTable {
            particles: association.particles,
            links: association.links,
        }
    }
}

impl TruthAssociation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a particle and return its key
    pub fn add_particle(&mut self, particle: TrackingParticle) -> u32 {
        self.particles.push(particle);
        (self.particles.len() - 1) as u32
    }

    /// Link a cluster to a particle key
    pub fn associate(&mut self, cluster: ClusterRef, particle: u32) {
        self.links.push(ClusterLink { cluster, particle });
        self.by_cluster.entry(cluster).or_default().push(particle);
    }

    #[must_use]
    pub fn particle(&self, key: u32) -> Option<&TrackingParticle> {
        self.particles.get(key as usize)
    }

    #[must_use]
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    /// Particles associated with a cluster, as (key, particle) in link order
    ///
    /// Links pointing past the particle collection are skipped.
    pub fn matches(
        &self,
        cluster: ClusterRef,
    ) -> impl Iterator<Item = (u32, &TrackingParticle)> + '_ {
        self.by_cluster
            .get(&cluster)
            .into_iter()
            .flatten()
            .filter_map(move |&key| self.particle(key).map(|p| (key, p)))
    }
}
