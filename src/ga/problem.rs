//! Berth assignment GA problem.
//!
//! Bridges vessels and berths to the generational loop. Scores are
//! pre-computed once per (vessel, berth) pair with the static variant of
//! the scoring engine, so fitness evaluation is a table lookup.
//!
//! # Fitness
//!
//! ```text
//! fitness = Σ score(v, g[v])
//!         - hard_violation_penalty  × (dimensional hard violations)
//!         - double_booking_penalty × Σ_berths max(0, vessels_on_berth - 1)
//! ```
//!
//! Windows are not modelled here; the best chromosome is re-validated with
//! exact windows when it is decoded.

use rand::Rng;
use rayon::prelude::*;

use super::chromosome::BerthChromosome;
use super::operators::GeneticOperators;
use super::runner::GaProblem;
use crate::config::GaConfig;
use crate::models::{Berth, Vessel};
use crate::scoring::{ScoringContext, ScoringEngine};

/// Pre-computed evaluation of one (vessel, berth) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    /// Static score in [0, 100].
    pub score: f64,
    /// Hard dimensional violations (LOA, draft, beam).
    pub hard_violations: u32,
}

/// GA problem definition for berth assignment.
#[derive(Debug, Clone)]
pub struct BerthGaProblem {
    /// `matrix[v][b]`: vessel `v` on berth `b`.
    pub matrix: Vec<Vec<PairScore>>,
    /// Physically feasible berth indices per vessel.
    pub feasible: Vec<Vec<usize>>,
    pub berth_count: usize,
    pub operators: GeneticOperators,
    pub mutation_rate: f64,
    pub hard_violation_penalty: f64,
    pub double_booking_penalty: f64,
}

impl BerthGaProblem {
    /// Builds the score matrix.
    pub fn new(
        vessels: &[Vessel],
        berths: &[Berth],
        scoring: &ScoringEngine,
        ctx: &ScoringContext,
        config: &GaConfig,
    ) -> Self {
        let score_row = |v: &Vessel| -> Vec<PairScore> {
            berths
                .iter()
                .map(|b| {
                    let c = scoring.evaluate_static(v, b, ctx);
                    PairScore {
                        score: c.total(),
                        hard_violations: c
                            .breakdown
                            .violations
                            .iter()
                            .filter(|x| x.is_hard() && x.constraint.is_dimensional())
                            .count() as u32,
                    }
                })
                .collect()
        };

        let matrix: Vec<Vec<PairScore>> = if config.parallel {
            vessels.par_iter().map(score_row).collect()
        } else {
            vessels.iter().map(score_row).collect()
        };

        let feasible = matrix
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, p)| p.hard_violations == 0)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        Self {
            matrix,
            feasible,
            berth_count: berths.len(),
            operators: GeneticOperators::default(),
            mutation_rate: config.mutation_rate,
            hard_violation_penalty: config.hard_violation_penalty,
            double_booking_penalty: config.double_booking_penalty,
        }
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    pub fn vessel_count(&self) -> usize {
        self.matrix.len()
    }

    /// Fitness of a gene vector.
    pub fn fitness(&self, genes: &[usize]) -> f64 {
        let mut total = 0.0;
        let mut load = vec![0u32; self.berth_count];

        for (row, &berth) in self.matrix.iter().zip(genes) {
            let Some(pair) = row.get(berth) else {
                total -= self.hard_violation_penalty;
                continue;
            };
            total += pair.score;
            total -= self.hard_violation_penalty * pair.hard_violations as f64;
            load[berth] += 1;
        }

        let double_booked: u32 = load.iter().map(|&n| n.saturating_sub(1)).sum();
        total - self.double_booking_penalty * double_booked as f64
    }
}

impl GaProblem for BerthGaProblem {
    type Individual = BerthChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> BerthChromosome {
        // 50% random, 50% physically feasible
        if rng.random_bool(0.5) {
            BerthChromosome::random(self.vessel_count(), self.berth_count, rng)
        } else {
            BerthChromosome::feasible_biased(&self.feasible, self.berth_count, rng)
        }
    }

    fn evaluate(&self, individual: &BerthChromosome) -> f64 {
        self.fitness(&individual.genes)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &BerthChromosome,
        parent2: &BerthChromosome,
        rng: &mut R,
    ) -> (BerthChromosome, BerthChromosome) {
        self.operators.crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut BerthChromosome, rng: &mut R) {
        self.operators
            .mutate(individual, self.berth_count, self.mutation_rate, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortConfig;
    use crate::models::HOUR_MS;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn vessels() -> Vec<Vessel> {
        vec![
            Vessel::new("BIG", 0)
                .with_dimensions(300.0, 45.0, 14.0)
                .with_etd(8 * HOUR_MS),
            Vessel::new("SMALL", 0)
                .with_dimensions(120.0, 20.0, 7.0)
                .with_etd(8 * HOUR_MS),
        ]
    }

    fn berths() -> Vec<Berth> {
        vec![Berth::new("DEEP", 320.0, 18.0), Berth::new("SHALLOW", 150.0, 10.0)]
    }

    fn problem() -> BerthGaProblem {
        let config = PortConfig::default();
        BerthGaProblem::new(
            &vessels(),
            &berths(),
            &ScoringEngine::new(&config),
            &ScoringContext::new(),
            &config.ga,
        )
    }

    #[test]
    fn test_matrix_and_feasibility() {
        let p = problem();
        assert_eq!(p.vessel_count(), 2);
        assert_eq!(p.berth_count, 2);
        // BIG fits only DEEP (LOA and draft fail at SHALLOW).
        assert_eq!(p.feasible[0], vec![0]);
        assert_eq!(p.matrix[0][1].hard_violations, 2);
        assert_eq!(p.feasible[1], vec![0, 1]);
        assert!(p.matrix[1][1].score > 0.0);
    }

    #[test]
    fn test_fitness_penalties() {
        let p = problem();
        let good = p.fitness(&[0, 1]);
        let shared = p.fitness(&[0, 0]);
        let infeasible = p.fitness(&[1, 0]);

        assert!(good > shared);
        assert!(good > infeasible);
        let expected_shared = p.matrix[0][0].score + p.matrix[1][0].score - 50.0;
        assert!((shared - expected_shared).abs() < 1e-9);
        let expected_infeasible =
            p.matrix[0][1].score + p.matrix[1][0].score - 200.0;
        assert!((infeasible - expected_infeasible).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_matrix_matches_sequential() {
        let config = PortConfig::default();
        let scoring = ScoringEngine::new(&config);
        let seq = BerthGaProblem::new(
            &vessels(),
            &berths(),
            &scoring,
            &ScoringContext::new(),
            &config.ga.clone().with_parallel(false),
        );
        assert_eq!(seq.matrix, problem().matrix);
    }

    #[test]
    fn test_created_individuals_are_valid() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut ind = p.create_individual(&mut rng);
            assert!(ind.is_valid(2, 2));
            p.mutate(&mut ind, &mut rng);
            assert!(ind.is_valid(2, 2));
        }
    }
}
