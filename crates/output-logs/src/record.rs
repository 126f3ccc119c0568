//! What every sink receives per doublet

use doublet_common::{BeamSpot, EventId};
use doublet_features::EncodedDoublet;
use doublet_truth::TruthBlock;
use serde::Serialize;

/// Event-level fields repeated at the start of every row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventHeader {
    pub id: EventId,
    /// In-time pileup interactions, -1 if unknown
    pub pileup: i32,
    pub beam_spot: BeamSpot,
}

/// One admitted doublet with everything derived from it
#[derive(Debug, Clone, Copy)]
pub struct DoubletRecord<'a> {
    pub event: &'a EventHeader,
    pub inner_seq: u32,
    pub outer_seq: u32,
    pub doublet: &'a EncodedDoublet,
    pub truth: &'a TruthBlock,
    pub label: f32,
    /// Image values exactly as placed in the batch
    pub image: &'a [f32],
    /// Feature values exactly as placed in the batch
    pub features: &'a [f32],
}
