//! Per-event input collections

use crate::hit::PixelHit;
use crate::truth::TruthAssociation;
use serde::{Deserialize, Serialize};

/// Run / luminosity block / event triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

/// Beam spot position and longitudinal width
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamSpot {
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
    pub sigma_z: f64,
}

/// Pileup summary for one bunch crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PileupSummary {
    pub bunch_crossing: i32,
    pub num_interactions: i32,
}

/// Number of pileup interactions in the triggered bunch crossing, -1 if unknown
#[must_use]
pub fn in_time_pileup(summaries: &[PileupSummary]) -> i32 {
    summaries
        .iter()
        .find(|s| s.bunch_crossing == 0)
        .map_or(-1, |s| s.num_interactions)
}

/// Which hit of a doublet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitRole {
    Inner,
    Outer,
}

/// Detector layer identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetLayer {
    pub seq_num: u32,
}

/// Indices of the two hits of a doublet into their layers' hit lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDoublet {
    pub inner: u32,
    pub outer: u32,
}

/// All doublets built from one (inner layer, outer layer) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPairDoublets {
    pub inner_layer: DetLayer,
    pub outer_layer: DetLayer,
    pub inner_hits: Vec<PixelHit>,
    pub outer_hits: Vec<PixelHit>,
    pub doublets: Vec<HitDoublet>,
}

impl LayerPairDoublets {
    /// Number of doublets in the group
    #[must_use]
    pub fn len(&self) -> usize {
        self.doublets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doublets.is_empty()
    }

    #[must_use]
    pub fn layer(&self, role: HitRole) -> DetLayer {
        match role {
            HitRole::Inner => self.inner_layer,
            HitRole::Outer => self.outer_layer,
        }
    }

    /// Hit of doublet `index` in the given role, `None` when either index is out of range
    #[must_use]
    pub fn hit(&self, index: usize, role: HitRole) -> Option<&PixelHit> {
        let doublet = self.doublets.get(index)?;
        match role {
            HitRole::Inner => self.inner_hits.get(doublet.inner as usize),
            HitRole::Outer => self.outer_hits.get(doublet.outer as usize),
        }
    }
}

/// Everything the pipeline consumes for one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInput {
    pub id: EventId,
    #[serde(default)]
    pub beam_spot: BeamSpot,
    #[serde(default)]
    pub pileup: Vec<PileupSummary>,
    pub layer_pairs: Vec<LayerPairDoublets>,
    #[serde(default)]
    pub truth: TruthAssociation,
}

impl EventInput {
    /// In-time pileup interaction count
    #[must_use]
    pub fn pileup_interactions(&self) -> i32 {
        in_time_pileup(&self.pileup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_time_pileup() {
        let summaries = vec![
            PileupSummary {
                bunch_crossing: -1,
                num_interactions: 31,
            },
            PileupSummary {
                bunch_crossing: 0,
                num_interactions: 42,
            },
            PileupSummary {
                bunch_crossing: 1,
                num_interactions: 28,
            },
        ];
        assert_eq!(in_time_pileup(&summaries), 42);
        assert_eq!(in_time_pileup(&summaries[..1]), -1);
        assert_eq!(in_time_pileup(&[]), -1);
    }

    #[test]
    fn test_hit_lookup_out_of_range() {
        let group = LayerPairDoublets {
            inner_layer: DetLayer { seq_num: 0 },
            outer_layer: DetLayer { seq_num: 1 },
            inner_hits: vec![],
            outer_hits: vec![],
            doublets: vec![HitDoublet { inner: 0, outer: 0 }],
        };
        assert_eq!(group.len(), 1);
        assert!(group.hit(0, HitRole::Inner).is_none());
        assert!(group.hit(5, HitRole::Outer).is_none());
        assert_eq!(group.layer(HitRole::Outer).seq_num, 1);
    }
}
