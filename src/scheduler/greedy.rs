//! Priority-driven greedy berth scheduler.
//!
//! # Algorithm
//!
//! 1. Sort vessels by (priority ordinal, arrival, ID); Emergency first.
//! 2. For each vessel, rank every berth for its requested window against
//!    the allocations committed so far (existing plus this pass).
//! 3. Walk the top `candidate_limit` feasible candidates in score order and
//!    commit the first whose window is free at that berth.
//! 4. If nothing fits, optionally retry with the window shifted later by
//!    `shift_step_ms`, up to `max_shift_steps` times.
//! 5. Otherwise report the vessel as unallocated with the violations of its
//!    best candidates.
//!
//! No backtracking: earlier commits reserve berth time for later vessels.
//!
//! # Complexity
//! O(V * B * A) where V=vessels, B=berths, A=committed allocations.

use tracing::{debug, info, instrument, warn};

use crate::config::{GreedyConfig, PortConfig};
use crate::constraints::mark_window_vessels;
use crate::models::{
    Allocation, AllocationResult, Berth, TimeWindow, UnallocatedVessel, Vessel, Violation,
};
use crate::scoring::{Candidate, ScoringContext, ScoringEngine};

/// Reason attached to vessels the pass could not place.
pub const NO_FEASIBLE_BERTH: &str = "no feasible berth";

/// Single-pass greedy scheduler.
///
/// # Example
///
/// ```
/// use u_berth::config::PortConfig;
/// use u_berth::models::{Berth, Vessel, HOUR_MS};
/// use u_berth::scheduler::GreedyScheduler;
/// use u_berth::scoring::ScoringContext;
///
/// let berths = vec![Berth::new("B1", 320.0, 18.0)];
/// let vessels = vec![
///     Vessel::new("V1", 10 * HOUR_MS)
///         .with_dimensions(300.0, 45.0, 14.0)
///         .with_etd(18 * HOUR_MS),
/// ];
///
/// let scheduler = GreedyScheduler::new(&PortConfig::default());
/// let result = scheduler.schedule(&vessels, &berths, &[], &ScoringContext::new());
/// assert_eq!(result.allocated.len(), 1);
/// assert_eq!(result.allocated[0].berth_id, "B1");
/// ```
#[derive(Debug, Clone)]
pub struct GreedyScheduler {
    scoring: ScoringEngine,
    config: GreedyConfig,
}

impl GreedyScheduler {
    /// Creates a scheduler with engines built from the configuration.
    pub fn new(config: &PortConfig) -> Self {
        Self {
            scoring: ScoringEngine::new(config),
            config: config.greedy.clone(),
        }
    }

    /// Replaces the scoring engine.
    pub fn with_scoring(mut self, scoring: ScoringEngine) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replaces the greedy settings.
    pub fn with_config(mut self, config: GreedyConfig) -> Self {
        self.config = config;
        self
    }

    /// Allocates vessels to berths.
    ///
    /// `existing` allocations reserve berth time. A vessel that already
    /// holds an active allocation in `existing` receives the next revision
    /// of it instead of a fresh record.
    #[instrument(skip_all, fields(vessels = vessels.len(), berths = berths.len()))]
    pub fn schedule(
        &self,
        vessels: &[Vessel],
        berths: &[Berth],
        existing: &[Allocation],
        ctx: &ScoringContext,
    ) -> AllocationResult {
        let mut committed: Vec<Allocation> = mark_window_vessels(existing, vessels);
        let mut result = AllocationResult::default();

        for idx in sort_vessels(vessels) {
            let vessel = &vessels[idx];
            let base = vessel.requested_window();

            match self.place(vessel, berths, &base, &committed, &result.allocated, ctx) {
                Ok((candidate, window)) => {
                    let soft: Vec<Violation> = candidate.breakdown.violations.clone();
                    let allocation = match committed
                        .iter()
                        .find(|a| a.vessel_id == vessel.id)
                    {
                        Some(prev) => prev.revised(&candidate.berth_id, window),
                        None => Allocation::new(&vessel.id, &candidate.berth_id, window),
                    }
                    .with_score(candidate.total())
                    .with_violations(soft)
                    .with_window_vessel(vessel.is_window_vessel());

                    debug!(
                        vessel = %vessel.id,
                        berth = %allocation.berth_id,
                        score = allocation.score,
                        start_ms = window.start_ms,
                        "vessel placed"
                    );

                    committed.retain(|a| a.vessel_id != vessel.id);
                    committed.push(allocation.clone());
                    result.allocated.push(allocation);
                }
                Err(violations) => {
                    warn!(
                        vessel = %vessel.id,
                        violations = violations.len(),
                        "vessel left unallocated"
                    );
                    result.unallocated.push(UnallocatedVessel {
                        vessel_id: vessel.id.clone(),
                        reason: NO_FEASIBLE_BERTH.to_string(),
                        violations,
                    });
                }
            }
        }

        info!(
            allocated = result.allocated.len(),
            unallocated = result.unallocated.len(),
            "greedy pass finished"
        );
        result
    }

    /// Finds the first free feasible candidate, trying shifted windows.
    ///
    /// On failure returns the hard violations of the best candidates for the
    /// requested window.
    fn place(
        &self,
        vessel: &Vessel,
        berths: &[Berth],
        base: &TimeWindow,
        committed: &[Allocation],
        placed: &[Allocation],
        ctx: &ScoringContext,
    ) -> Result<(Candidate, TimeWindow), Vec<Violation>> {
        let mut diagnostics = None;

        for step in 0..=self.config.max_shift_steps {
            let window = base.shifted(step as i64 * self.config.shift_step_ms);
            let ranked = self
                .scoring
                .rank_berths(vessel, berths, &window, committed, ctx);

            let free = ranked
                .iter()
                .filter(|c| c.is_feasible())
                .take(self.config.candidate_limit)
                .find(|c| {
                    !placed
                        .iter()
                        .any(|a| a.berth_id == c.berth_id && a.window.overlaps(&window))
                });
            if let Some(candidate) = free {
                return Ok((candidate.clone(), window));
            }

            if diagnostics.is_none() {
                diagnostics = Some(best_violations(&ranked, self.config.candidate_limit));
            }
        }

        Err(diagnostics.unwrap_or_default())
    }
}

impl Default for GreedyScheduler {
    fn default() -> Self {
        Self::new(&PortConfig::default())
    }
}

/// Vessel indices in scheduling order: priority ordinal, arrival, ID.
pub fn sort_vessels(vessels: &[Vessel]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vessels.len()).collect();
    order.sort_by(|&a, &b| {
        let (va, vb) = (&vessels[a], &vessels[b]);
        va.priority
            .ordinal()
            .cmp(&vb.priority.ordinal())
            .then_with(|| va.arrival_ms().cmp(&vb.arrival_ms()))
            .then_with(|| va.id.cmp(&vb.id))
    });
    order
}

fn best_violations(ranked: &[Candidate], limit: usize) -> Vec<Violation> {
    ranked
        .iter()
        .take(limit.max(1))
        .flat_map(|c| c.breakdown.violations.iter().filter(|v| v.is_hard()).cloned())
        .collect()
}
