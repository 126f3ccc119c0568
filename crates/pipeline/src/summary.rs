//! Per-group and per-event counters

use doublet_common::EventId;
use serde::Serialize;

/// Counters of one layer-pair group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GroupSummary {
    pub inner_seq: u32,
    pub outer_seq: u32,
    /// Doublets in the input group
    pub doublets: usize,
    /// Doublets that passed the pixel-only guard
    pub admitted: usize,
    /// Admitted doublets labelled genuine
    pub matched: usize,
    /// Doublets whose z0 was replaced by the sentinel
    pub z0_faults: usize,
    /// Doublets the model scored as genuine
    pub predicted_real: usize,
}

/// Counters of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub id: EventId,
    pub pileup: i32,
    /// Layer-pair groups in the input
    pub groups_seen: usize,
    /// Groups on pixel layer pairs
    pub groups: Vec<GroupSummary>,
}

impl EventSummary {
    #[must_use]
    pub fn new(id: EventId, pileup: i32, groups_seen: usize) -> Self {
        Self {
            id,
            pileup,
            groups_seen,
            groups: Vec::new(),
        }
    }

    /// Admitted doublets over all groups
    #[must_use]
    pub fn admitted(&self) -> usize {
        self.groups.iter().map(|g| g.admitted).sum()
    }

    #[must_use]
    pub fn matched(&self) -> usize {
        self.groups.iter().map(|g| g.matched).sum()
    }

    #[must_use]
    pub fn predicted_real(&self) -> usize {
        self.groups.iter().map(|g| g.predicted_real).sum()
    }

    #[must_use]
    pub fn z0_faults(&self) -> usize {
        self.groups.iter().map(|g| g.z0_faults).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_totals() {
        let id = EventId {
            run: 1,
            lumi: 1,
            event: 1,
        };
        let mut summary = EventSummary::new(id, 20, 3);
        summary.groups.push(GroupSummary {
            admitted: 4,
            matched: 1,
            predicted_real: 2,
            ..Default::default()
        });
        summary.groups.push(GroupSummary {
            admitted: 6,
            matched: 3,
            z0_faults: 1,
            ..Default::default()
        });
        assert_eq!(summary.admitted(), 10);
        assert_eq!(summary.matched(), 4);
        assert_eq!(summary.predicted_real(), 2);
        assert_eq!(summary.z0_faults(), 1);
    }
}
