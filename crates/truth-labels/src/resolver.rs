//! Truth matching of doublets against the cluster association

use crate::block::{ParticleBlock, TruthBlock};
use doublet_common::{DoubletConfig, HasCluster, TruthAssociation, SENTINEL};
use serde::Serialize;
use tracing::debug;

/// (particle key, pdg id), the identity used for matching
pub type ParticleId = (u32, i32);

/// Outcome of matching one doublet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruthMatch {
    /// Particles shared by both clusters, sorted
    pub common: Vec<ParticleId>,
    pub species_mask: u32,
    pub block: TruthBlock,
}

impl TruthMatch {
    /// Both hits come from at least one common particle
    #[must_use]
    pub fn is_matched(&self) -> bool {
        !self.common.is_empty()
    }

    /// 1.0 for a genuine segment, 0.0 otherwise
    #[must_use]
    pub fn label(&self) -> f32 {
        if self.is_matched() {
            1.0
        } else {
            0.0
        }
    }
}

/// Set intersection of two sorted lists, keeping duplicates pairwise
fn sorted_intersection(a: &[ParticleId], b: &[ParticleId]) -> Vec<ParticleId> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Assigns labels and truth blocks
#[derive(Debug, Clone, Copy)]
pub struct LabelResolver<'c> {
    config: &'c DoubletConfig,
}

impl<'c> LabelResolver<'c> {
    #[must_use]
    pub fn new(config: &'c DoubletConfig) -> Self {
        Self { config }
    }

    /// Bit i is set when species i of the configured list is among `pdg_ids`
    ///
    /// Species past the 32nd entry have no bit and are skipped.
    #[must_use]
    pub fn species_mask<I>(&self, pdg_ids: I) -> u32
    where
        I: IntoIterator<Item = i32> + Clone,
    {
        self.config
            .particle_species
            .iter()
            .enumerate()
            .filter(|(_, species)| pdg_ids.clone().into_iter().any(|id| id == **species))
            .filter_map(|(bit, _)| u32::try_from(bit).ok().and_then(|b| 1u32.checked_shl(b)))
            .fold(0, |mask, bit| mask | bit)
    }

    /// Match the clusters of both hits
    ///
    /// Never fails: links to unknown particles are ignored and sides without
    /// any association get sentinel blocks. Without a shared particle each
    /// side reports its lowest-key link.
    #[must_use]
    pub fn resolve<H: HasCluster>(
        &self,
        truth: &TruthAssociation,
        inner: &H,
        outer: &H,
    ) -> TruthMatch {
        let ids = |hit: &H| -> Vec<ParticleId> {
            truth
                .matches(hit.cluster_ref())
                .map(|(key, p)| (key, p.pdg_id))
                .collect()
        };
        let mut inner_sorted = ids(inner);
        let mut outer_sorted = ids(outer);
        inner_sorted.sort_unstable();
        outer_sorted.sort_unstable();
        let common = sorted_intersection(&inner_sorted, &outer_sorted);

        let particle_block = |id: Option<&ParticleId>| {
            id.and_then(|&(key, _)| {
                truth
                    .particle(key)
                    .map(|p| ParticleBlock::from_particle(key, p))
            })
            .unwrap_or_else(ParticleBlock::missing)
        };

        if let Some(first) = common.first() {
            let species_mask = self.species_mask(common.iter().map(|&(_, pdg)| pdg));
            let particle = particle_block(Some(first));
            debug!(
                "Matched doublet: {} shared particle(s), first key {}",
                common.len(),
                first.0
            );
            TruthMatch {
                block: TruthBlock {
                    header: [1.0, common.len() as f32, species_mask as f32],
                    inner: particle,
                    outer: particle,
                },
                common,
                species_mask,
            }
        } else {
            TruthMatch {
                block: TruthBlock {
                    header: [SENTINEL; 3],
                    inner: particle_block(inner_sorted.first()),
                    outer: particle_block(outer_sorted.first()),
                },
                common,
                species_mask: 0,
            }
        }
    }
}
