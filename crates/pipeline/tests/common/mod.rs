#![allow(dead_code)]

use doublet_common::{
    BeamSpot, Cluster, ClusterRef, DetId, DetLayer, EventId, EventInput, FourMomentum,
    GlobalPoint, HitDoublet, LayerPairDoublets, ModuleSurface, PileupSummary, Pixel, PixelHit,
    TrackingParticle, TruthAssociation, Vertex,
};
use doublet_inference::{DoubletBatch, DoubletClassifier, DoubletScore, InferenceError};

/// Scores each doublet with its label, so matched doublets come out real
#[derive(Debug, Default)]
pub struct LabelEchoClassifier {
    pub batches: Vec<usize>,
}

impl DoubletClassifier for LabelEchoClassifier {
    fn classify(&mut self, batch: &DoubletBatch) -> Result<Vec<DoubletScore>, InferenceError> {
        self.batches.push(batch.len());
        Ok(batch
            .labels()
            .iter()
            .map(|&label| {
                let real = 0.1 + 0.8 * label;
                DoubletScore::new(1.0 - real, real)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "label-echo"
    }
}

/// Always returns one score too few
pub struct ShortClassifier;

impl DoubletClassifier for ShortClassifier {
    fn classify(&mut self, batch: &DoubletBatch) -> Result<Vec<DoubletScore>, InferenceError> {
        Ok(vec![DoubletScore::new(0.5, 0.5); batch.len().saturating_sub(1)])
    }

    fn name(&self) -> &str {
        "short"
    }
}

pub fn block_cluster(x: f32, y: f32, size_x: u16, size_y: u16, adc: u16) -> Cluster {
    let mut pixels = Vec::new();
    for dy in 0..size_y {
        for dx in 0..size_x {
            pixels.push(Pixel {
                x: x as u16 + dx,
                y: y as u16 + dy,
                adc,
            });
        }
    }
    Cluster {
        x,
        y,
        size_x,
        size_y,
        charge: u32::from(adc) * u32::from(size_x) * u32::from(size_y),
        pixels,
        spans_two_rocs: false,
        has_bad_pixels: false,
        is_on_edge: false,
    }
}

pub fn barrel_hit(cluster: u32, r: f32) -> PixelHit {
    PixelHit {
        position: GlobalPoint::new(r, 0.3, 1.5),
        phi: 0.3f32.atan2(r),
        r,
        det_id: DetId::Barrel {
            layer: 2,
            ladder: 5,
            module: 3,
        },
        surface: ModuleSurface::default(),
        cluster_ref: ClusterRef(cluster),
        cluster: block_cluster(10.0, 10.0, 2, 2, 100),
    }
}

pub fn forward_hit(cluster: u32, r: f32) -> PixelHit {
    PixelHit {
        position: GlobalPoint::new(r, -0.4, 33.0),
        phi: (-0.4f32).atan2(r),
        r,
        det_id: DetId::Forward {
            side: 1,
            disk: 1,
            panel: 1,
            module: 1,
        },
        surface: ModuleSurface::default(),
        cluster_ref: ClusterRef(cluster),
        cluster: block_cluster(12.0, 11.0, 3, 2, 150),
    }
}

pub fn strip_hit(cluster: u32, r: f32) -> PixelHit {
    PixelHit {
        det_id: DetId::Other { subdetector: 3 },
        ..barrel_hit(cluster, r)
    }
}

pub fn event_id(run: u32, event: u64) -> EventId {
    EventId {
        run,
        lumi: 4,
        event,
    }
}

/// One barrel-to-forward doublet without any truth
pub fn single_doublet_event() -> EventInput {
    EventInput {
        id: event_id(1, 100),
        beam_spot: BeamSpot {
            x0: 0.08,
            y0: -0.03,
            z0: 0.4,
            sigma_z: 3.6,
        },
        pileup: vec![PileupSummary {
            bunch_crossing: 0,
            num_interactions: 27,
        }],
        layer_pairs: vec![LayerPairDoublets {
            inner_layer: DetLayer { seq_num: 1 },
            outer_layer: DetLayer { seq_num: 14 },
            inner_hits: vec![barrel_hit(1, 6.8)],
            outer_hits: vec![forward_hit(2, 9.0)],
            doublets: vec![HitDoublet { inner: 0, outer: 0 }],
        }],
        truth: TruthAssociation::new(),
    }
}

fn pion() -> TrackingParticle {
    TrackingParticle {
        pdg_id: 211,
        charge: 1,
        momentum: FourMomentum::new(1.2, 0.1, 2.0, 2.34),
        vertex: Vertex {
            x: 0.01,
            y: 0.0,
            z: 0.2,
        },
        n_tracker_hits: 20,
        n_tracker_layers: 13,
        bunch_crossing: 0,
    }
}

/// Three groups: a pixel pair with one genuine and two fake doublets (one of
/// them on a strip module), a non-pixel pair, and a pixel pair with no doublets
pub fn mixed_event(run: u32, event: u64) -> EventInput {
    let mut truth = TruthAssociation::new();
    let key = truth.add_particle(pion());
    truth.associate(ClusterRef(10), key);
    truth.associate(ClusterRef(20), key);

    EventInput {
        id: event_id(run, event),
        beam_spot: BeamSpot::default(),
        pileup: Vec::new(),
        layer_pairs: vec![
            LayerPairDoublets {
                inner_layer: DetLayer { seq_num: 0 },
                outer_layer: DetLayer { seq_num: 1 },
                inner_hits: vec![barrel_hit(10, 4.4), barrel_hit(11, 4.5)],
                outer_hits: vec![barrel_hit(20, 7.3), strip_hit(21, 7.4)],
                doublets: vec![
                    HitDoublet { inner: 0, outer: 0 },
                    HitDoublet { inner: 1, outer: 0 },
                    HitDoublet { inner: 1, outer: 1 },
                ],
            },
            LayerPairDoublets {
                inner_layer: DetLayer { seq_num: 3 },
                outer_layer: DetLayer { seq_num: 4 },
                inner_hits: vec![barrel_hit(30, 16.0)],
                outer_hits: vec![barrel_hit(31, 25.0)],
                doublets: vec![HitDoublet { inner: 0, outer: 0 }],
            },
            LayerPairDoublets {
                inner_layer: DetLayer { seq_num: 14 },
                outer_layer: DetLayer { seq_num: 15 },
                inner_hits: Vec::new(),
                outer_hits: Vec::new(),
                doublets: Vec::new(),
            },
        ],
        truth,
    }
}
