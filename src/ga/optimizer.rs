//! Population optimizer over a batch of vessels.
//!
//! Runs the GA on a [`BerthGaProblem`] and decodes the best chromosome into
//! allocations, re-validating each one with exact windows against the
//! existing plan and the allocations decoded before it.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::chromosome::BerthChromosome;
use super::operators::GeneticOperators;
use super::problem::BerthGaProblem;
use super::runner::{GaRunner, Termination};
use crate::config::{GaConfig, PortConfig};
use crate::constraints::mark_window_vessels;
use crate::models::{
    Allocation, AllocationResult, Berth, UnallocatedVessel, Vessel, Violation,
};
use crate::scheduler::{NO_FEASIBLE_BERTH, sort_vessels};
use crate::scoring::{ScoringContext, ScoringEngine};

/// Reason attached to vessels whose GA assignment fails exact validation.
pub const FAILED_REVALIDATION: &str = "failed re-validation";

/// Result of a population optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Decoded and re-validated allocations.
    pub allocation: AllocationResult,
    /// Fitness of the best chromosome.
    pub fitness: f64,
    /// Generations completed.
    pub generations: usize,
    pub termination: Termination,
}

impl OptimizationResult {
    /// Whether the run stopped on its time budget or stop flag.
    pub fn budget_exceeded(&self) -> bool {
        self.termination == Termination::BudgetExceeded
    }
}

/// Genetic search for a full-horizon re-plan.
///
/// # Example
///
/// ```
/// use u_berth::config::{GaConfig, PortConfig};
/// use u_berth::ga::BerthOptimizer;
/// use u_berth::models::{Berth, Vessel, HOUR_MS};
/// use u_berth::scoring::ScoringContext;
///
/// let config = PortConfig::default().with_ga(
///     GaConfig::default()
///         .with_population_size(20)
///         .with_max_generations(10)
///         .with_seed(42),
/// );
/// let berths = vec![Berth::new("B1", 320.0, 18.0), Berth::new("B2", 320.0, 18.0)];
/// let vessels = vec![
///     Vessel::new("V1", 0).with_dimensions(300.0, 45.0, 14.0).with_etd(8 * HOUR_MS),
///     Vessel::new("V2", 0).with_dimensions(200.0, 30.0, 10.0).with_etd(8 * HOUR_MS),
/// ];
///
/// let result = BerthOptimizer::new(&config).optimize(&vessels, &berths, &[], &ScoringContext::new());
/// assert_eq!(result.allocation.allocated.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BerthOptimizer {
    scoring: ScoringEngine,
    config: GaConfig,
    operators: GeneticOperators,
    stop: Option<Arc<AtomicBool>>,
}

impl BerthOptimizer {
    pub fn new(config: &PortConfig) -> Self {
        Self {
            scoring: ScoringEngine::new(config),
            config: config.ga.clone(),
            operators: GeneticOperators::default(),
            stop: None,
        }
    }

    /// Replaces the scoring engine.
    pub fn with_scoring(mut self, scoring: ScoringEngine) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replaces the GA settings.
    pub fn with_config(mut self, config: GaConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Sets a cooperative stop flag checked at each generation boundary.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Optimizes with an RNG seeded from `config.seed`, or from the OS.
    pub fn optimize(
        &self,
        vessels: &[Vessel],
        berths: &[Berth],
        existing: &[Allocation],
        ctx: &ScoringContext,
    ) -> OptimizationResult {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.optimize_with_rng(vessels, berths, existing, ctx, &mut rng)
    }

    /// Optimizes with the given random source.
    #[instrument(skip_all, fields(vessels = vessels.len(), berths = berths.len()))]
    pub fn optimize_with_rng<R: Rng>(
        &self,
        vessels: &[Vessel],
        berths: &[Berth],
        existing: &[Allocation],
        ctx: &ScoringContext,
        rng: &mut R,
    ) -> OptimizationResult {
        if vessels.is_empty() || berths.is_empty() {
            let unallocated = vessels
                .iter()
                .map(|v| UnallocatedVessel {
                    vessel_id: v.id.clone(),
                    reason: NO_FEASIBLE_BERTH.to_string(),
                    violations: Vec::new(),
                })
                .collect();
            return OptimizationResult {
                allocation: AllocationResult {
                    allocated: Vec::new(),
                    unallocated,
                },
                fitness: 0.0,
                generations: 0,
                termination: Termination::Completed,
            };
        }

        let problem = BerthGaProblem::new(vessels, berths, &self.scoring, ctx, &self.config)
            .with_operators(self.operators.clone());

        let mut runner = GaRunner::new(self.config.clone());
        if let Some(stop) = &self.stop {
            runner = runner.with_stop_flag(Arc::clone(stop));
        }
        let outcome = runner.run(&problem, rng);

        let allocation = self.decode(&outcome.best, vessels, berths, existing, ctx);
        info!(
            fitness = outcome.best.fitness,
            generations = outcome.generations,
            allocated = allocation.allocated.len(),
            unallocated = allocation.unallocated.len(),
            "GA run finished"
        );

        OptimizationResult {
            allocation,
            fitness: outcome.best.fitness,
            generations: outcome.generations,
            termination: outcome.termination,
        }
    }

    /// Turns a chromosome into allocations, in priority/arrival order.
    ///
    /// Each assignment is validated with the vessel's requested window
    /// against active `existing` allocations and those decoded before it.
    /// Assignments with hard violations become unallocated vessels.
    pub fn decode(
        &self,
        chromosome: &BerthChromosome,
        vessels: &[Vessel],
        berths: &[Berth],
        existing: &[Allocation],
        ctx: &ScoringContext,
    ) -> AllocationResult {
        let mut committed: Vec<Allocation> = mark_window_vessels(existing, vessels);
        let mut result = AllocationResult::default();

        for idx in sort_vessels(vessels) {
            let vessel = &vessels[idx];
            let Some(berth) = chromosome.genes.get(idx).and_then(|&b| berths.get(b)) else {
                result.unallocated.push(UnallocatedVessel {
                    vessel_id: vessel.id.clone(),
                    reason: NO_FEASIBLE_BERTH.to_string(),
                    violations: Vec::new(),
                });
                continue;
            };

            let window = vessel.requested_window();
            let candidate = self.scoring.evaluate(vessel, berth, &window, &committed, ctx);
            if !candidate.is_feasible() {
                let violations: Vec<Violation> = candidate
                    .breakdown
                    .violations
                    .into_iter()
                    .filter(|v| v.is_hard())
                    .collect();
                warn!(vessel = %vessel.id, berth = %berth.id, "GA assignment failed re-validation");
                result.unallocated.push(UnallocatedVessel {
                    vessel_id: vessel.id.clone(),
                    reason: FAILED_REVALIDATION.to_string(),
                    violations,
                });
                continue;
            }

            let allocation = match committed.iter().find(|a| a.vessel_id == vessel.id) {
                Some(prev) => prev.revised(&berth.id, window),
                None => Allocation::new(&vessel.id, &berth.id, window),
            }
            .with_score(candidate.total())
            .with_violations(candidate.breakdown.violations)
            .with_window_vessel(vessel.is_window_vessel());

            committed.retain(|a| a.vessel_id != vessel.id);
            committed.push(allocation.clone());
            result.allocated.push(allocation);
        }

        result
    }
}

impl Default for BerthOptimizer {
    fn default() -> Self {
        Self::new(&PortConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintName, HOUR_MS, Priority, TimeWindow};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn config() -> PortConfig {
        PortConfig::default().with_ga(
            GaConfig::default()
                .with_population_size(30)
                .with_max_generations(40)
                .with_seed(42),
        )
    }

    fn vessel(id: &str, loa: f64, draft: f64) -> Vessel {
        Vessel::new(id, 10 * HOUR_MS)
            .with_dimensions(loa, 30.0, draft)
            .with_etd(18 * HOUR_MS)
    }

    fn berths() -> Vec<Berth> {
        vec![
            Berth::new("DEEP", 320.0, 18.0),
            Berth::new("MID", 250.0, 13.0),
            Berth::new("SHALLOW", 150.0, 9.0),
        ]
    }

    #[test]
    fn test_finds_one_berth_per_vessel() {
        let vessels = vec![
            vessel("V1", 300.0, 14.0),
            vessel("V2", 220.0, 10.0),
            vessel("V3", 120.0, 6.0),
        ];
        let result = BerthOptimizer::new(&config()).optimize(
            &vessels,
            &berths(),
            &[],
            &ScoringContext::new(),
        );
        assert_eq!(result.termination, Termination::Completed);
        assert_eq!(result.generations, 40);
        assert_eq!(result.allocation.allocated.len(), 3);
        assert_eq!(result.allocation.allocation_for("V1").unwrap().berth_id, "DEEP");
        assert_eq!(result.allocation.allocation_for("V2").unwrap().berth_id, "MID");
        assert_eq!(result.allocation.allocation_for("V3").unwrap().berth_id, "SHALLOW");
        assert!(result.fitness > 0.0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let vessels = vec![
            vessel("V1", 300.0, 14.0),
            vessel("V2", 220.0, 10.0),
            vessel("V3", 120.0, 6.0),
        ];
        let opt = BerthOptimizer::new(&config());
        let a = opt.optimize(&vessels, &berths(), &[], &ScoringContext::new());
        let b = opt.optimize(&vessels, &berths(), &[], &ScoringContext::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_revalidates_windows() {
        // Both vessels need DEEP at the same time; the chromosome puts both there.
        let vessels = vec![
            vessel("V1", 300.0, 14.0).with_priority(Priority::Emergency),
            vessel("V2", 300.0, 14.0),
        ];
        let opt = BerthOptimizer::new(&config());
        let ch = BerthChromosome::new(vec![0, 0]);
        let result = opt.decode(&ch, &vessels, &berths(), &[], &ScoringContext::new());

        assert_eq!(result.allocated.len(), 1);
        assert_eq!(result.allocated[0].vessel_id, "V1");
        let u = &result.unallocated[0];
        assert_eq!(u.vessel_id, "V2");
        assert_eq!(u.reason, FAILED_REVALIDATION);
        assert!(u.violations.iter().any(|v| v.constraint == ConstraintName::BerthOccupied));
    }

    #[test]
    fn test_decode_respects_existing() {
        let existing = vec![Allocation::new(
            "V0",
            "DEEP",
            TimeWindow::new(9 * HOUR_MS, 11 * HOUR_MS),
        )];
        let opt = BerthOptimizer::new(&config());
        let ch = BerthChromosome::new(vec![0]);
        let result = opt.decode(
            &ch,
            &[vessel("V1", 300.0, 14.0)],
            &berths(),
            &existing,
            &ScoringContext::new(),
        );
        assert!(result.is_unallocated("V1"));
    }

    #[test]
    fn test_budget_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        flag.store(true, Ordering::Relaxed);
        let result = BerthOptimizer::new(&config())
            .with_stop_flag(flag)
            .optimize(&[vessel("V1", 300.0, 14.0)], &berths(), &[], &ScoringContext::new());
        assert!(result.budget_exceeded());
        assert_eq!(result.generations, 0);
        // Best-so-far is still decoded.
        assert_eq!(result.allocation.allocated.len() + result.allocation.unallocated.len(), 1);

        let timed = BerthOptimizer::new(&config())
            .with_config(config().ga.with_time_limit(Duration::ZERO))
            .optimize(&[vessel("V1", 300.0, 14.0)], &berths(), &[], &ScoringContext::new());
        assert!(timed.budget_exceeded());
    }

    #[test]
    fn test_empty_inputs() {
        let opt = BerthOptimizer::new(&config());
        let none = opt.optimize(&[], &berths(), &[], &ScoringContext::new());
        assert!(none.allocation.allocated.is_empty());
        assert!(!none.budget_exceeded());

        let no_berths = opt.optimize(&[vessel("V1", 100.0, 5.0)], &[], &[], &ScoringContext::new());
        assert!(no_berths.allocation.is_unallocated("V1"));
    }
}
