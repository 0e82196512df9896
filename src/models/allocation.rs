//! Allocation (solution) model.
//!
//! An allocation binds one vessel to one berth for a time window. The
//! allocation set is the plan: it never holds two active allocations at the
//! same berth with overlapping windows once committed by a scheduler, and
//! changes supersede records instead of editing them, so the set doubles as
//! an audit trail.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::TimeWindow;

/// Whether a violation excludes the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Safety / physical; the allocation is infeasible.
    Hard,
    /// Commercial; reduces the score only.
    Soft,
}

/// Named constraint that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintName {
    LoaLimit,
    DraftLimit,
    BeamLimit,
    BerthMaintenance,
    BerthOccupied,
    WindowVesselExclusion,
    DaylightOnly,
    ExclusionZone,
    CargoTypeMismatch,
    /// Pilot demand in one arrival hour exceeds the pilot pool.
    PilotCapacity,
    /// Tug demand in one arrival hour exceeds the tug pool.
    TugCapacity,
}

impl ConstraintName {
    /// Stable upper-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintName::LoaLimit => "LOA_LIMIT",
            ConstraintName::DraftLimit => "DRAFT_LIMIT",
            ConstraintName::BeamLimit => "BEAM_LIMIT",
            ConstraintName::BerthMaintenance => "BERTH_MAINTENANCE",
            ConstraintName::BerthOccupied => "BERTH_OCCUPIED",
            ConstraintName::WindowVesselExclusion => "WINDOW_VESSEL_EXCLUSION",
            ConstraintName::DaylightOnly => "DAYLIGHT_ONLY",
            ConstraintName::ExclusionZone => "EXCLUSION_ZONE",
            ConstraintName::CargoTypeMismatch => "CARGO_TYPE_MISMATCH",
            ConstraintName::PilotCapacity => "PILOT_CAPACITY",
            ConstraintName::TugCapacity => "TUG_CAPACITY",
        }
    }

    /// Whether the constraint is about vessel dimensions.
    pub fn is_dimensional(self) -> bool {
        matches!(
            self,
            ConstraintName::LoaLimit | ConstraintName::DraftLimit | ConstraintName::BeamLimit
        )
    }
}

impl fmt::Display for ConstraintName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint violation for a vessel/berth/window triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Hard or soft.
    pub kind: ViolationKind,
    /// Constraint that failed.
    pub constraint: ConstraintName,
    /// Related entity ID (usually the berth).
    pub entity_id: String,
    /// Human-readable description with the values involved.
    pub message: String,
    /// Score points deducted (soft violations only).
    pub penalty: f64,
}

impl Violation {
    /// Creates a hard violation.
    pub fn hard(
        constraint: ConstraintName,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ViolationKind::Hard,
            constraint,
            entity_id: entity_id.into(),
            message: message.into(),
            penalty: 0.0,
        }
    }

    /// Creates a soft violation carrying a score penalty.
    pub fn soft(
        constraint: ConstraintName,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        penalty: f64,
    ) -> Self {
        Self {
            kind: ViolationKind::Soft,
            constraint,
            entity_id: entity_id.into(),
            message: message.into(),
            penalty,
        }
    }

    #[inline]
    pub fn is_hard(&self) -> bool {
        self.kind == ViolationKind::Hard
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ViolationKind::Hard => "HARD",
            ViolationKind::Soft => "SOFT",
        };
        write!(f, "[{kind}] {}: {}", self.constraint, self.message)
    }
}

/// Whether any violation in the list is hard.
pub fn has_hard(violations: &[Violation]) -> bool {
    violations.iter().any(Violation::is_hard)
}

/// Lifecycle of an allocation record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllocationStatus {
    #[default]
    Active,
    /// Replaced by the allocation with the given ID.
    Superseded { by: String },
}

/// A vessel-berth-time allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Unique allocation identifier.
    pub id: String,
    /// Allocated vessel ID.
    pub vessel_id: String,
    /// Allocated berth ID.
    pub berth_id: String,
    /// Berth occupancy.
    pub window: TimeWindow,
    /// Score (0-100) at the time of allocation.
    pub score: f64,
    /// Soft violations accepted with this allocation.
    pub violations: Vec<Violation>,
    /// The vessel is under window-vessel policy (hazardous or LNG).
    #[serde(default)]
    pub window_vessel: bool,
    /// Revision of this vessel's allocation (0 = first).
    pub revision: u32,
    /// Lifecycle status.
    pub status: AllocationStatus,
}

impl Allocation {
    /// Creates an active first-revision allocation.
    pub fn new(
        vessel_id: impl Into<String>,
        berth_id: impl Into<String>,
        window: TimeWindow,
    ) -> Self {
        let vessel_id = vessel_id.into();
        let berth_id = berth_id.into();
        Self {
            id: Self::make_id(&vessel_id, 0),
            vessel_id,
            berth_id,
            window,
            score: 0.0,
            violations: Vec::new(),
            window_vessel: false,
            revision: 0,
            status: AllocationStatus::Active,
        }
    }

    /// Sets the score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Sets the accepted violations.
    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }

    /// Marks the occupant as a window vessel.
    pub fn with_window_vessel(mut self, window_vessel: bool) -> Self {
        self.window_vessel = window_vessel;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == AllocationStatus::Active
    }

    /// Next revision of this allocation with a new berth and window.
    pub fn revised(&self, berth_id: impl Into<String>, window: TimeWindow) -> Self {
        let revision = self.revision + 1;
        Self {
            id: Self::make_id(&self.vessel_id, revision),
            vessel_id: self.vessel_id.clone(),
            berth_id: berth_id.into(),
            window,
            score: self.score,
            violations: Vec::new(),
            window_vessel: self.window_vessel,
            revision,
            status: AllocationStatus::Active,
        }
    }

    fn make_id(vessel_id: &str, revision: u32) -> String {
        format!("{vessel_id}/r{revision}")
    }
}

/// A vessel that could not be allocated, with the explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnallocatedVessel {
    pub vessel_id: String,
    pub reason: String,
    /// Violations of the best rejected candidates.
    pub violations: Vec<Violation>,
}

/// Result of a planning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Allocations committed by this pass, in commit order.
    pub allocated: Vec<Allocation>,
    /// Vessels that could not be placed.
    pub unallocated: Vec<UnallocatedVessel>,
}

impl AllocationResult {
    /// Finds the allocation for a vessel.
    pub fn allocation_for(&self, vessel_id: &str) -> Option<&Allocation> {
        self.allocated.iter().find(|a| a.vessel_id == vessel_id)
    }

    /// Whether a vessel is reported unallocated.
    pub fn is_unallocated(&self, vessel_id: &str) -> bool {
        self.unallocated.iter().any(|u| u.vessel_id == vessel_id)
    }
}

/// Versioned set of allocations with audit history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationSet {
    /// All records, active and superseded, in insertion order.
    pub allocations: Vec<Allocation>,
    /// Incremented on every mutation.
    pub version: u64,
}

impl AllocationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from existing records.
    pub fn from_allocations(allocations: Vec<Allocation>) -> Self {
        Self {
            allocations,
            version: 0,
        }
    }

    /// Appends an allocation.
    pub fn add(&mut self, allocation: Allocation) {
        self.allocations.push(allocation);
        self.version += 1;
    }

    /// Active allocations.
    pub fn active(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.iter().filter(|a| a.is_active())
    }

    /// Active allocations at a berth.
    pub fn active_at_berth<'a>(&'a self, berth_id: &'a str) -> impl Iterator<Item = &'a Allocation> {
        self.active().filter(move |a| a.berth_id == berth_id)
    }

    /// Active allocations grouped by berth, ordered by berth ID then start.
    pub fn by_berth(&self) -> BTreeMap<&str, Vec<&Allocation>> {
        let mut map: BTreeMap<&str, Vec<&Allocation>> = BTreeMap::new();
        for a in self.active() {
            map.entry(a.berth_id.as_str()).or_default().push(a);
        }
        for list in map.values_mut() {
            list.sort_by(|a, b| {
                a.window
                    .start_ms
                    .cmp(&b.window.start_ms)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        map
    }

    /// Finds any record by ID.
    pub fn get(&self, id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// Active allocation of a vessel.
    pub fn active_for_vessel(&self, vessel_id: &str) -> Option<&Allocation> {
        self.active().find(|a| a.vessel_id == vessel_id)
    }

    /// Full history of a vessel, oldest first.
    pub fn history_for_vessel(&self, vessel_id: &str) -> Vec<&Allocation> {
        let mut list: Vec<&Allocation> = self
            .allocations
            .iter()
            .filter(|a| a.vessel_id == vessel_id)
            .collect();
        list.sort_by_key(|a| a.revision);
        list
    }

    /// Supersedes the active record `id` with `replacement`.
    ///
    /// Returns `false` (and changes nothing) if `id` is not active.
    pub fn supersede(&mut self, id: &str, replacement: Allocation) -> bool {
        let Some(old) = self
            .allocations
            .iter_mut()
            .find(|a| a.id == id && a.is_active())
        else {
            return false;
        };
        old.status = AllocationStatus::Superseded {
            by: replacement.id.clone(),
        };
        self.allocations.push(replacement);
        self.version += 1;
        true
    }

    /// Whether a window at a berth overlaps an active allocation,
    /// ignoring the record `except_id`.
    pub fn overlaps_at(&self, berth_id: &str, window: &TimeWindow, except_id: Option<&str>) -> bool {
        self.active_at_berth(berth_id)
            .filter(|a| Some(a.id.as_str()) != except_id)
            .any(|a| a.window.overlaps(window))
    }

    /// Number of active allocations.
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Busy time per berth over active allocations (ms).
    pub fn busy_ms_by_berth(&self) -> HashMap<String, i64> {
        let mut busy: HashMap<String, i64> = HashMap::new();
        for a in self.active() {
            *busy.entry(a.berth_id.clone()).or_insert(0) += a.window.duration_ms();
        }
        busy
    }

    /// Earliest start and latest end over active allocations.
    pub fn horizon(&self) -> Option<TimeWindow> {
        let start = self.active().map(|a| a.window.start_ms).min()?;
        let end = self.active().map(|a| a.window.end_ms).max()?;
        TimeWindow::try_new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> AllocationSet {
        let mut s = AllocationSet::new();
        s.add(Allocation::new("V1", "B1", TimeWindow::new(0, 5000)).with_score(80.0));
        s.add(Allocation::new("V2", "B2", TimeWindow::new(1000, 4000)));
        s.add(Allocation::new("V3", "B1", TimeWindow::new(5000, 8000)));
        s
    }

    #[test]
    fn test_active_and_by_berth() {
        let s = sample_set();
        assert_eq!(s.active_count(), 3);
        let by_berth = s.by_berth();
        assert_eq!(by_berth["B1"].len(), 2);
        assert_eq!(by_berth["B1"][0].vessel_id, "V1");
        assert_eq!(by_berth["B2"].len(), 1);
    }

    #[test]
    fn test_supersede_keeps_history() {
        let mut s = sample_set();
        let old = s.active_for_vessel("V3").unwrap().clone();
        let new = old.revised("B2", TimeWindow::new(6000, 9000));
        assert!(s.supersede(&old.id, new.clone()));

        assert_eq!(s.active_count(), 3);
        assert_eq!(s.allocations.len(), 4);
        assert_eq!(s.active_for_vessel("V3").unwrap().berth_id, "B2");
        let history = s.history_for_vessel("V3");
        assert_eq!(history.len(), 2);
        assert_eq!(
            history[0].status,
            AllocationStatus::Superseded { by: new.id.clone() }
        );
        assert_eq!(history[1].revision, 1);

        // Superseding a superseded record is refused.
        assert!(!s.supersede(&old.id, new));
    }

    #[test]
    fn test_revision_keeps_window_vessel_flag() {
        let a = Allocation::new("H1", "B1", TimeWindow::new(0, 5000)).with_window_vessel(true);
        let r = a.revised("B2", TimeWindow::new(6000, 9000));
        assert!(r.window_vessel);
        assert_eq!(r.id, "H1/r1");
        assert!(!Allocation::new("V1", "B1", TimeWindow::new(0, 1)).window_vessel);
    }

    #[test]
    fn test_overlaps_at() {
        let s = sample_set();
        assert!(s.overlaps_at("B1", &TimeWindow::new(4000, 6000), None));
        assert!(!s.overlaps_at("B1", &TimeWindow::new(8000, 9000), None));
        assert!(!s.overlaps_at("B1", &TimeWindow::new(0, 4000), Some("V1/r0")));
    }

    #[test]
    fn test_busy_and_horizon() {
        let s = sample_set();
        let busy = s.busy_ms_by_berth();
        assert_eq!(busy["B1"], 8000);
        assert_eq!(busy["B2"], 3000);
        assert_eq!(s.horizon(), Some(TimeWindow::new(0, 8000)));
        assert_eq!(AllocationSet::new().horizon(), None);
    }

    #[test]
    fn test_violation_factories() {
        let h = Violation::hard(ConstraintName::DraftLimit, "B1", "too deep");
        assert!(h.is_hard());
        assert_eq!(h.penalty, 0.0);
        let s = Violation::soft(ConstraintName::CargoTypeMismatch, "B1", "mismatch", 15.0);
        assert!(!s.is_hard());
        assert!(has_hard(&[s.clone(), h]));
        assert!(!has_hard(&[s]));
        assert_eq!(ConstraintName::DraftLimit.to_string(), "DRAFT_LIMIT");
    }
}
