//! Planning facade.
//!
//! Wires the engines built from one [`PortConfig`] over a
//! [`PlanningSnapshot`]. Every entry point validates the snapshot first and
//! fails with [`PlanningError::InvalidInput`] before any scheduling attempt.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PortConfig;
use crate::conflict::ConflictEngine;
use crate::constraints::mark_window_vessels;
use crate::error::{PlanningError, PlanningResult};
use crate::ga::{BerthOptimizer, OptimizationResult};
use crate::models::{
    Allocation, AllocationResult, AllocationSet, Berth, Conflict, ConflictReport, Resolution,
    Vessel,
};
use crate::scheduler::{AllocationKpi, GreedyScheduler};
use crate::scoring::{Candidate, ScoringContext, ScoringEngine};
use crate::validation::{
    ValidationError, ValidationErrorKind, validate_snapshot, validate_vessel_references,
};

/// Frozen port state for one planning call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningSnapshot {
    pub vessels: Vec<Vessel>,
    pub berths: Vec<Berth>,
    /// Committed allocations, with history.
    pub allocations: AllocationSet,
    /// Queues, visit history and resource availability.
    #[serde(default)]
    pub context: ScoringContext,
}

impl PlanningSnapshot {
    pub fn new(vessels: Vec<Vessel>, berths: Vec<Berth>) -> Self {
        Self {
            vessels,
            berths,
            ..Self::default()
        }
    }

    pub fn with_allocations(mut self, allocations: AllocationSet) -> Self {
        self.allocations = allocations;
        self
    }

    pub fn with_context(mut self, context: ScoringContext) -> Self {
        self.context = context;
        self
    }

    /// Active committed allocations, window-vessel occupants flagged.
    pub fn active_allocations(&self) -> Vec<Allocation> {
        mark_window_vessels(&self.allocations.allocations, &self.vessels)
    }

    fn validate(&self) -> PlanningResult<()> {
        validate_snapshot(&self.vessels, &self.berths, &self.allocations.allocations)?;
        Ok(())
    }
}

/// Entry point combining scoring, greedy, GA and conflict engines.
///
/// Holds no state between calls; any number of planners (or calls on one
/// planner) can run in parallel over their own snapshots.
#[derive(Debug, Clone)]
pub struct BerthPlanner {
    config: PortConfig,
    scoring: ScoringEngine,
    greedy: GreedyScheduler,
    optimizer: BerthOptimizer,
    conflicts: ConflictEngine,
}

impl BerthPlanner {
    pub fn new(config: PortConfig) -> Self {
        Self {
            scoring: ScoringEngine::new(&config),
            greedy: GreedyScheduler::new(&config),
            optimizer: BerthOptimizer::new(&config),
            conflicts: ConflictEngine::new(&config),
            config,
        }
    }

    /// Cancels running GA searches when the flag is raised.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.optimizer = self.optimizer.with_stop_flag(stop);
        self
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// Ranks every berth for a vessel of the snapshot over its requested
    /// window.
    pub fn rank_berths(
        &self,
        snapshot: &PlanningSnapshot,
        vessel_id: &str,
    ) -> PlanningResult<Vec<Candidate>> {
        snapshot.validate()?;
        let vessel = find_vessel(snapshot, vessel_id)?;
        Ok(self.scoring.rank_berths(
            vessel,
            &snapshot.berths,
            &vessel.requested_window(),
            &snapshot.active_allocations(),
            &snapshot.context,
        ))
    }

    /// Greedy pass over all vessels of the snapshot.
    pub fn allocate(&self, snapshot: &PlanningSnapshot) -> PlanningResult<AllocationResult> {
        snapshot.validate()?;
        Ok(self.greedy.schedule(
            &snapshot.vessels,
            &snapshot.berths,
            &snapshot.active_allocations(),
            &snapshot.context,
        ))
    }

    /// GA search over all vessels of the snapshot.
    pub fn optimize(&self, snapshot: &PlanningSnapshot) -> PlanningResult<OptimizationResult> {
        snapshot.validate()?;
        Ok(self.optimizer.optimize(
            &snapshot.vessels,
            &snapshot.berths,
            &snapshot.active_allocations(),
            &snapshot.context,
        ))
    }

    /// GA search with an injected random source.
    pub fn optimize_with_rng<R: Rng>(
        &self,
        snapshot: &PlanningSnapshot,
        rng: &mut R,
    ) -> PlanningResult<OptimizationResult> {
        snapshot.validate()?;
        Ok(self.optimizer.optimize_with_rng(
            &snapshot.vessels,
            &snapshot.berths,
            &snapshot.active_allocations(),
            &snapshot.context,
            rng,
        ))
    }

    /// Scans the committed allocations for conflicts.
    ///
    /// The vessel snapshot must cover every active allocation.
    pub fn detect_conflicts(&self, snapshot: &PlanningSnapshot) -> PlanningResult<ConflictReport> {
        snapshot.validate()?;
        validate_vessel_references(&snapshot.vessels, &snapshot.allocations.allocations)?;
        Ok(self.conflicts.detect(
            &snapshot.allocations,
            &snapshot.vessels,
            &snapshot.berths,
            &snapshot.context,
        ))
    }

    /// Commits a proposed resolution; see
    /// [`ConflictEngine::commit_resolution`].
    pub fn commit_resolution(
        &self,
        snapshot: &PlanningSnapshot,
        conflict: &Conflict,
        resolution: &Resolution,
    ) -> PlanningResult<(AllocationSet, ConflictReport)> {
        snapshot.validate()?;
        validate_vessel_references(&snapshot.vessels, &snapshot.allocations.allocations)?;
        self.conflicts.commit_resolution(
            &snapshot.allocations,
            conflict,
            resolution,
            &snapshot.vessels,
            &snapshot.berths,
            &snapshot.context,
        )
    }

    /// KPIs of a pass over the snapshot's vessels and berths.
    pub fn kpi(&self, snapshot: &PlanningSnapshot, result: &AllocationResult) -> AllocationKpi {
        AllocationKpi::calculate(result, &snapshot.vessels, &snapshot.berths)
    }

    /// Commits a pass result into an allocation set.
    ///
    /// Revisions supersede the vessel's active allocation; first
    /// allocations are appended.
    pub fn apply(&self, set: &AllocationSet, result: &AllocationResult) -> AllocationSet {
        let mut next = set.clone();
        for a in &result.allocated {
            let previous = next.active_for_vessel(&a.vessel_id).map(|p| p.id.clone());
            match previous {
                Some(id) if id != a.id => {
                    next.supersede(&id, a.clone());
                }
                Some(_) => {}
                None => next.add(a.clone()),
            }
        }
        debug!(
            version = next.version,
            active = next.active_count(),
            "pass result applied"
        );
        next
    }
}

impl Default for BerthPlanner {
    fn default() -> Self {
        Self::new(PortConfig::default())
    }
}

fn find_vessel<'a>(snapshot: &'a PlanningSnapshot, vessel_id: &str) -> PlanningResult<&'a Vessel> {
    snapshot
        .vessels
        .iter()
        .find(|v| v.id == vessel_id)
        .ok_or_else(|| {
            PlanningError::InvalidInput(vec![ValidationError::new(
                ValidationErrorKind::InvalidVesselReference,
                format!("Unknown vessel '{vessel_id}'"),
            )])
        })
}
