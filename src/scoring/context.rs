//! Scoring context for candidate evaluation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::ResourceAvailability;

/// Port state passed to the scoring engine alongside the allocations.
///
/// Contains queue depths, past berth usage and resource availability at
/// the time of the request. Everything is owned so a context can be shared
/// read-only across worker threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringContext {
    /// Vessels already waiting for each berth (berth_id → count).
    pub queue_depth: HashMap<String, u32>,
    /// Past calls per vessel_id, then berth_id.
    pub visit_history: HashMap<String, HashMap<String, u32>>,
    /// Pilots, tugs and cranes currently free.
    pub resources: ResourceAvailability,
}

impl ScoringContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the queue depth at a berth.
    pub fn with_queue(mut self, berth_id: impl Into<String>, depth: u32) -> Self {
        self.queue_depth.insert(berth_id.into(), depth);
        self
    }

    /// Records past calls of a vessel at a berth.
    pub fn with_visits(
        mut self,
        vessel_id: impl Into<String>,
        berth_id: impl Into<String>,
        visits: u32,
    ) -> Self {
        self.visit_history
            .entry(vessel_id.into())
            .or_default()
            .insert(berth_id.into(), visits);
        self
    }

    /// Sets the resource snapshot.
    pub fn with_resources(mut self, resources: ResourceAvailability) -> Self {
        self.resources = resources;
        self
    }

    /// Queue depth at a berth (0 if unknown).
    pub fn queue_at(&self, berth_id: &str) -> u32 {
        self.queue_depth.get(berth_id).copied().unwrap_or(0)
    }

    /// Past calls of a vessel at a berth (0 if unknown).
    pub fn visits(&self, vessel_id: &str, berth_id: &str) -> u32 {
        self.visit_history
            .get(vessel_id)
            .and_then(|calls| calls.get(berth_id))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_default_to_zero() {
        let ctx = ScoringContext::new().with_queue("B1", 3).with_visits("V1", "B2", 4);
        assert_eq!(ctx.queue_at("B1"), 3);
        assert_eq!(ctx.queue_at("B9"), 0);
        assert_eq!(ctx.visits("V1", "B2"), 4);
        assert_eq!(ctx.visits("V1", "B1"), 0);
        assert_eq!(ctx.visits("V9", "B2"), 0);
    }
}
