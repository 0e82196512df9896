//! Conflict and resolution records.
//!
//! Conflicts are derived from an allocation set and recomputed whenever the
//! set changes; they are never stored on their own.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ResourceKind, TimeWindow, Violation};

/// Kind of scheduling conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    /// Two allocations overlap at the same berth.
    TemporalOverlap,
    /// Pilot or tug demand in one arrival hour exceeds what is available.
    ResourceShortage,
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::TemporalOverlap => f.write_str("TEMPORAL_OVERLAP"),
            ConflictType::ResourceShortage => f.write_str("RESOURCE_SHORTAGE"),
        }
    }
}

/// Resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionStrategy {
    /// Delay a vessel.
    TimeShift,
    /// Move a vessel to another berth.
    BerthSwap,
    /// Cut the higher-priority vessel's stay short.
    PriorityOverride,
    /// Move an arrival to an hour with spare pilot or tug capacity.
    ResourceReallocation,
}

/// Change a resolution applies to its target allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedChange {
    /// Allocation being replaced.
    pub allocation_id: String,
    /// Berth after the change.
    pub berth_id: String,
    /// Window after the change.
    pub window: TimeWindow,
}

/// Knock-on overlap caused by applying a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadingEffect {
    /// Vessel whose existing allocation would now overlap.
    pub vessel_id: String,
    pub berth_id: String,
    pub overlap_minutes: i64,
}

/// A proposed way out of a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub strategy: ResolutionStrategy,
    /// Vessel whose allocation changes.
    pub target_vessel_id: String,
    pub change: ProposedChange,
    /// 0 = no disruption, 100 = major disruption.
    pub impact_score: f64,
    /// Overlaps the change would create elsewhere.
    pub cascading_effects: Vec<CascadingEffect>,
    /// Human-readable summary.
    pub description: String,
}

/// A detected conflict with its ranked resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Deterministic identifier derived from the conflict's members.
    pub id: String,
    pub conflict_type: ConflictType,
    /// 1-10, higher = worse.
    pub severity: u8,
    pub vessel_ids: Vec<String>,
    pub berth_ids: Vec<String>,
    /// Allocations involved.
    pub allocation_ids: Vec<String>,
    /// Period in conflict (overlap intersection, or the hour bucket).
    pub window: TimeWindow,
    /// Overlap length for temporal conflicts.
    pub overlap_minutes: Option<i64>,
    /// Exhausted resource for shortage conflicts.
    #[serde(default)]
    pub resource: Option<ResourceKind>,
    /// Resolutions, least disruptive first.
    pub resolutions: Vec<Resolution>,
    /// Why each rejected proposal failed; populated when nothing is feasible.
    pub diagnostics: Vec<Violation>,
}

impl Conflict {
    /// Whether at least one feasible resolution exists.
    pub fn is_resolvable(&self) -> bool {
        !self.resolutions.is_empty()
    }

    /// Least disruptive resolution.
    pub fn best_resolution(&self) -> Option<&Resolution> {
        self.resolutions.first()
    }

    /// Whether the conflict involves a vessel.
    pub fn involves(&self, vessel_id: &str) -> bool {
        self.vessel_ids.iter().any(|v| v == vessel_id)
    }
}

/// Output of a conflict scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Version of the allocation set that was scanned.
    pub allocation_version: u64,
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts of one type.
    pub fn of_type(&self, conflict_type: ConflictType) -> impl Iterator<Item = &Conflict> {
        self.conflicts
            .iter()
            .filter(move |c| c.conflict_type == conflict_type)
    }

    /// All resolutions across conflicts.
    pub fn resolutions(&self) -> impl Iterator<Item = (&Conflict, &Resolution)> {
        self.conflicts
            .iter()
            .flat_map(|c| c.resolutions.iter().map(move |r| (c, r)))
    }

    /// Conflicts with no feasible resolution.
    pub fn unresolvable(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| !c.is_resolvable())
    }

    pub fn get(&self, conflict_id: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.id == conflict_id)
    }
}
