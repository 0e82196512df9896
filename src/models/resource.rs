//! Shared marine-service resources.
//!
//! Pilots and tugs are pooled across the port; quay cranes belong to a
//! berth but may be out of service. The snapshot is supplied fully
//! populated by the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::Berth;

/// Kind of shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Pilot,
    Tug,
    Crane,
}

impl ResourceKind {
    /// Stable upper-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pilot => "PILOT",
            ResourceKind::Tug => "TUG",
            ResourceKind::Crane => "CRANE",
        }
    }

    /// Lower-case noun for messages.
    pub fn noun(self) -> &'static str {
        match self {
            ResourceKind::Pilot => "pilot",
            ResourceKind::Tug => "tug",
            ResourceKind::Crane => "crane",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource availability snapshot.
///
/// `None` pool sizes mean "not reported"; scoring then treats the pool as
/// unconstrained and shortage detection falls back to the configured
/// concurrency threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceAvailability {
    /// Pilots currently free.
    pub pilots_available: Option<u32>,
    /// Tugs currently free.
    pub tugs_available: Option<u32>,
    /// Cranes out of service per berth ID.
    pub cranes_out_of_service: HashMap<String, u32>,
}

impl ResourceAvailability {
    /// Creates an empty (unreported) snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of free pilots.
    pub fn with_pilots(mut self, pilots: u32) -> Self {
        self.pilots_available = Some(pilots);
        self
    }

    /// Sets the number of free tugs.
    pub fn with_tugs(mut self, tugs: u32) -> Self {
        self.tugs_available = Some(tugs);
        self
    }

    /// Marks cranes at a berth as out of service.
    pub fn with_cranes_down(mut self, berth_id: impl Into<String>, count: u32) -> Self {
        self.cranes_out_of_service.insert(berth_id.into(), count);
        self
    }

    /// Working cranes at `berth`.
    pub fn cranes_available(&self, berth: &Berth) -> u32 {
        let down = self
            .cranes_out_of_service
            .get(&berth.id)
            .copied()
            .unwrap_or(0);
        berth.crane_count.saturating_sub(down)
    }

    /// Free units of a pooled resource, if reported.
    pub fn pool(&self, kind: ResourceKind) -> Option<u32> {
        match kind {
            ResourceKind::Pilot => self.pilots_available,
            ResourceKind::Tug => self.tugs_available,
            ResourceKind::Crane => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cranes_available() {
        let berth = Berth::new("B1", 300.0, 15.0).with_cranes(4);
        let snap = ResourceAvailability::new().with_cranes_down("B1", 1);
        assert_eq!(snap.cranes_available(&berth), 3);

        let snap = ResourceAvailability::new().with_cranes_down("B1", 9);
        assert_eq!(snap.cranes_available(&berth), 0);
    }

    #[test]
    fn test_pools() {
        let snap = ResourceAvailability::new().with_pilots(3).with_tugs(5);
        assert_eq!(snap.pool(ResourceKind::Pilot), Some(3));
        assert_eq!(snap.pool(ResourceKind::Tug), Some(5));
        assert_eq!(ResourceAvailability::new().pool(ResourceKind::Pilot), None);
        assert_eq!(ResourceKind::Tug.to_string(), "TUG");
    }
}
