//! Conflict detection and resolution.
//!
//! Scans a committed allocation set for:
//! - **Temporal overlaps**: two active allocations at the same berth with
//!   overlapping windows (severity 10 by default).
//! - **Resource shortages**: pilot or tug demand in one arrival hour above
//!   what is available (severity 5 by default). With a reported pool the
//!   units each vessel needs are summed and compared with the pool;
//!   without one, arrivals needing the resource are counted against the
//!   configured concurrency threshold. Tugs are only checked when their
//!   pool is reported or a tug threshold is configured.
//!
//! Each conflict carries ranked resolution proposals. A conflict is only
//! resolved when the caller commits one of them with
//! [`ConflictEngine::commit_resolution`], which supersedes the affected
//! allocation and re-runs detection on the new set.

mod detection;
mod resolution;

use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::config::{ConflictConfig, PortConfig};
use crate::error::{PlanningError, PlanningResult};
use crate::models::{
    Allocation, AllocationSet, Berth, Conflict, ConflictReport, ConflictType, ConstraintName,
    Resolution, ResourceKind, Vessel, defaults,
};
use crate::scoring::{ScoringContext, ScoringEngine};
use crate::validation::{ValidationError, ValidationErrorKind};

use resolution::Proposer;

/// Vessel and berth lookup for one scan.
pub(crate) struct Snapshot<'a> {
    vessels: HashMap<&'a str, &'a Vessel>,
    berths: &'a [Berth],
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(vessels: &'a [Vessel], berths: &'a [Berth]) -> Self {
        Self {
            vessels: vessels.iter().map(|v| (v.id.as_str(), v)).collect(),
            berths,
        }
    }

    fn vessel(&self, id: &str) -> Option<&'a Vessel> {
        self.vessels.get(id).copied()
    }

    fn berth(&self, id: &str) -> Option<&'a Berth> {
        self.berths.iter().find(|b| b.id == id)
    }

    fn berths_sorted(&self) -> Vec<&'a Berth> {
        let mut list: Vec<&Berth> = self.berths.iter().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    /// Units of a pooled resource a vessel needs; unknown vessels get the
    /// default requirement of the smallest class.
    fn needed(&self, kind: ResourceKind, vessel_id: &str) -> u32 {
        let vessel = self.vessel(vessel_id);
        match kind {
            ResourceKind::Pilot => vessel
                .map(Vessel::pilots_needed)
                .unwrap_or(defaults::PILOTS_REQUIRED),
            ResourceKind::Tug => vessel
                .map(Vessel::tugs_needed)
                .unwrap_or_else(|| defaults::tugs_for_loa(0.0)),
            ResourceKind::Crane => 0,
        }
    }

    /// Priority ordinal; unknown vessels rank last.
    fn priority_ordinal(&self, vessel_id: &str) -> u8 {
        self.vessel(vessel_id)
            .map(|v| v.priority.ordinal())
            .unwrap_or(defaults::PRIORITY_ORDINAL)
    }
}

/// Per-hour capacity check for one pooled resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortageRule {
    kind: ResourceKind,
    capacity: u32,
    per_unit: bool,
}

impl ShortageRule {
    /// Sums the units each arrival needs; used against a reported pool.
    pub fn per_unit(kind: ResourceKind, capacity: u32) -> Self {
        Self {
            kind,
            capacity,
            per_unit: true,
        }
    }

    /// Counts arrivals that need the resource at all.
    pub fn per_arrival(kind: ResourceKind, capacity: u32) -> Self {
        Self {
            kind,
            capacity,
            per_unit: false,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Demand tolerated per arrival hour.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_per_unit(&self) -> bool {
        self.per_unit
    }

    /// Constraint reported when an arrival finds no spare hour.
    pub fn constraint(&self) -> ConstraintName {
        match self.kind {
            ResourceKind::Tug => ConstraintName::TugCapacity,
            _ => ConstraintName::PilotCapacity,
        }
    }

    fn demand(&self, snapshot: &Snapshot<'_>, vessel_id: &str) -> u32 {
        let needed = snapshot.needed(self.kind, vessel_id);
        if self.per_unit {
            needed
        } else {
            u32::from(needed > 0)
        }
    }
}

/// Detects conflicts in an allocation set and proposes resolutions.
#[derive(Debug, Clone)]
pub struct ConflictEngine {
    scoring: ScoringEngine,
    config: ConflictConfig,
}

impl ConflictEngine {
    pub fn new(config: &PortConfig) -> Self {
        Self {
            scoring: ScoringEngine::new(config),
            config: config.conflict.clone(),
        }
    }

    /// Replaces the scoring engine used for berth-swap proposals.
    pub fn with_scoring(mut self, scoring: ScoringEngine) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replaces the conflict settings.
    pub fn with_config(mut self, config: ConflictConfig) -> Self {
        self.config = config;
        self
    }

    /// Shortage checks in force for `ctx`, pilots first.
    pub fn shortage_rules(&self, ctx: &ScoringContext) -> Vec<ShortageRule> {
        let mut rules = vec![match ctx.resources.pool(ResourceKind::Pilot) {
            Some(pool) => ShortageRule::per_unit(ResourceKind::Pilot, pool),
            None => ShortageRule::per_arrival(ResourceKind::Pilot, self.config.pilot_concurrency),
        }];
        match (ctx.resources.pool(ResourceKind::Tug), self.config.tug_concurrency) {
            (Some(pool), _) => rules.push(ShortageRule::per_unit(ResourceKind::Tug, pool)),
            (None, Some(limit)) => rules.push(ShortageRule::per_arrival(ResourceKind::Tug, limit)),
            (None, None) => {}
        }
        rules
    }

    /// Scans the active allocations of `set`.
    ///
    /// Overlaps come first (by berth, then start), then pilot shortages by
    /// hour, then tug shortages by hour.
    #[instrument(skip_all, fields(version = set.version, active = set.active_count()))]
    pub fn detect(
        &self,
        set: &AllocationSet,
        vessels: &[Vessel],
        berths: &[Berth],
        ctx: &ScoringContext,
    ) -> ConflictReport {
        let snapshot = Snapshot::new(vessels, berths);
        let active: Vec<Allocation> = set.active().cloned().collect();
        let proposer = Proposer {
            scoring: &self.scoring,
            config: &self.config,
            snapshot: &snapshot,
            ctx,
            active: &active,
        };

        let mut conflicts = detection::temporal_overlaps(set, self.config.overlap_severity);
        for c in conflicts.iter_mut() {
            proposer.resolve_overlap(c);
        }

        for rule in self.shortage_rules(ctx) {
            let buckets = detection::demand_buckets(set, &snapshot, &rule);
            let load = detection::bucket_load(&buckets);
            for mut c in detection::shortages(&buckets, &rule, self.config.shortage_severity) {
                proposer.resolve_shortage(&mut c, &rule, &load);
                conflicts.push(c);
            }
        }

        for c in conflicts.iter().filter(|c| !c.is_resolvable()) {
            warn!(
                conflict = %c.id,
                diagnostics = c.diagnostics.len(),
                "conflict has no feasible resolution"
            );
        }
        info!(
            conflicts = conflicts.len(),
            overlaps = conflicts
                .iter()
                .filter(|c| c.conflict_type == ConflictType::TemporalOverlap)
                .count(),
            "conflict scan finished"
        );

        ConflictReport {
            allocation_version: set.version,
            conflicts,
        }
    }

    /// Applies a proposed resolution and re-runs detection.
    ///
    /// The target allocation is superseded by its next revision; the input
    /// set is left untouched.
    ///
    /// # Errors
    /// - `UnknownResolution` if `resolution` was not proposed for `conflict`
    /// - `UnknownAllocation` if the target is no longer active in `set`
    /// - `InvalidInput` if the vessel or berth is missing from the snapshots
    /// - `ResolutionRejected` if the change now violates a hard constraint
    pub fn commit_resolution(
        &self,
        set: &AllocationSet,
        conflict: &Conflict,
        resolution: &Resolution,
        vessels: &[Vessel],
        berths: &[Berth],
        ctx: &ScoringContext,
    ) -> PlanningResult<(AllocationSet, ConflictReport)> {
        if !conflict.resolutions.contains(resolution) {
            return Err(PlanningError::UnknownResolution {
                conflict_id: conflict.id.clone(),
                vessel_id: resolution.target_vessel_id.clone(),
            });
        }

        let change = &resolution.change;
        let current = set
            .get(&change.allocation_id)
            .filter(|a| a.is_active())
            .ok_or_else(|| PlanningError::UnknownAllocation(change.allocation_id.clone()))?;

        let snapshot = Snapshot::new(vessels, berths);
        let vessel = snapshot.vessel(&current.vessel_id).ok_or_else(|| {
            PlanningError::InvalidInput(vec![ValidationError::new(
                ValidationErrorKind::InvalidVesselReference,
                format!(
                    "Allocation '{}' references unknown vessel '{}'",
                    current.id, current.vessel_id
                ),
            )])
        })?;
        let berth = snapshot.berth(&change.berth_id).ok_or_else(|| {
            PlanningError::InvalidInput(vec![ValidationError::new(
                ValidationErrorKind::InvalidBerthReference,
                format!("Resolution references unknown berth '{}'", change.berth_id),
            )])
        })?;

        let violations = self
            .scoring
            .validator()
            .validate(vessel, berth, &change.window, &[]);
        let hard: Vec<_> = violations.iter().filter(|v| v.is_hard()).cloned().collect();
        if !hard.is_empty() {
            return Err(PlanningError::ResolutionRejected {
                vessel_id: vessel.id.clone(),
                violations: hard,
            });
        }

        let active: Vec<Allocation> = set.active().cloned().collect();
        let score = self
            .scoring
            .score(vessel, berth, &change.window, &violations, &active, ctx)
            .total;
        let replacement = current
            .revised(&berth.id, change.window)
            .with_score(score)
            .with_violations(violations);

        let mut next = set.clone();
        if !next.supersede(&change.allocation_id, replacement) {
            return Err(PlanningError::UnknownAllocation(change.allocation_id.clone()));
        }
        debug!(
            conflict = %conflict.id,
            vessel = %vessel.id,
            strategy = ?resolution.strategy,
            "resolution committed"
        );

        let report = self.detect(&next, vessels, berths, ctx);
        Ok((next, report))
    }

    /// Commits the least disruptive resolution of a conflict.
    ///
    /// # Errors
    /// `ConflictUnresolvable` with the conflict's diagnostics if it has no
    /// resolution; otherwise as [`Self::commit_resolution`].
    pub fn resolve_best(
        &self,
        set: &AllocationSet,
        conflict: &Conflict,
        vessels: &[Vessel],
        berths: &[Berth],
        ctx: &ScoringContext,
    ) -> PlanningResult<(AllocationSet, ConflictReport)> {
        let Some(best) = conflict.best_resolution() else {
            return Err(PlanningError::ConflictUnresolvable {
                conflict_id: conflict.id.clone(),
                violations: conflict.diagnostics.clone(),
            });
        };
        self.commit_resolution(set, conflict, best, vessels, berths, ctx)
    }
}

impl Default for ConflictEngine {
    fn default() -> Self {
        Self::new(&PortConfig::default())
    }
}
