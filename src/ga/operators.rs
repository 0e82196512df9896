//! Configurable genetic operators for berth assignment.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`], and tournament selection.
//!
//! # Usage
//!
//! ```
//! use u_berth::ga::operators::{GeneticOperators, CrossoverType, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::SinglePoint);
//! assert_eq!(ops.mutation_type, MutationType::RandomBerth);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{
    BerthChromosome, random_berth_mutation, single_point_crossover, swap_mutation,
    uniform_crossover,
};
use super::runner::Individual;

/// Crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Exchange tails after one random cut point.
    SinglePoint,
    /// Pick each gene from either parent.
    Uniform,
}

/// Mutation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationType {
    /// Per-gene reassignment to a random berth.
    RandomBerth,
    /// Exchange the berths of two vessels, then per-gene reassignment.
    Swap,
}

/// Runtime-selectable genetic operators.
///
/// # Example
///
/// ```
/// use u_berth::ga::operators::{GeneticOperators, CrossoverType, MutationType};
///
/// let ops = GeneticOperators {
///     crossover_type: CrossoverType::Uniform,
///     mutation_type: MutationType::Swap,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::SinglePoint,
            mutation_type: MutationType::RandomBerth,
        }
    }
}

impl GeneticOperators {
    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &BerthChromosome,
        p2: &BerthChromosome,
        rng: &mut R,
    ) -> (BerthChromosome, BerthChromosome) {
        match self.crossover_type {
            CrossoverType::SinglePoint => single_point_crossover(p1, p2, rng),
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
        }
    }

    /// Performs mutation using the configured strategy.
    ///
    /// Random-berth reassignment at `rate` per gene always applies.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut BerthChromosome,
        berth_count: usize,
        rate: f64,
        rng: &mut R,
    ) {
        if self.mutation_type == MutationType::Swap && rng.random_bool(rate.clamp(0.0, 1.0)) {
            swap_mutation(chromosome, rng);
        }
        random_berth_mutation(chromosome, berth_count, rate, rng);
    }
}

/// Tournament selection: samples `size` individuals with replacement and
/// returns the fittest.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament_select<'a, I: Individual, R: Rng>(
    population: &'a [I],
    size: usize,
    rng: &mut R,
) -> &'a I {
    let n = population.len();
    let mut best = &population[rng.random_range(0..n)];
    for _ in 1..size.max(1) {
        let challenger = &population[rng.random_range(0..n)];
        if challenger.fitness() > best.fitness() {
            best = challenger;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn scored(genes: Vec<usize>, fitness: f64) -> BerthChromosome {
        let mut ch = BerthChromosome::new(genes);
        ch.fitness = fitness;
        ch
    }

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert_eq!(ops.crossover_type, CrossoverType::SinglePoint);
        assert_eq!(ops.mutation_type, MutationType::RandomBerth);
    }

    #[test]
    fn test_crossover_variants() {
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = BerthChromosome::new(vec![0, 0, 0, 0]);
        let p2 = BerthChromosome::new(vec![2, 2, 2, 2]);
        for crossover_type in [CrossoverType::SinglePoint, CrossoverType::Uniform] {
            let ops = GeneticOperators {
                crossover_type,
                mutation_type: MutationType::RandomBerth,
            };
            let (c1, c2) = ops.crossover(&p1, &p2, &mut rng);
            assert_eq!(c1.len(), 4);
            assert_eq!(c2.len(), 4);
            assert!(c1.genes.iter().all(|&g| g == 0 || g == 2));
        }
    }

    #[test]
    fn test_mutation_keeps_valid_indices() {
        let mut rng = SmallRng::seed_from_u64(42);
        for mutation_type in [MutationType::RandomBerth, MutationType::Swap] {
            let ops = GeneticOperators {
                crossover_type: CrossoverType::SinglePoint,
                mutation_type,
            };
            let mut ch = BerthChromosome::new(vec![0, 1, 2, 0, 1]);
            for _ in 0..20 {
                ops.mutate(&mut ch, 3, 0.5, &mut rng);
            }
            assert!(ch.is_valid(5, 3));
        }
    }

    #[test]
    fn test_zero_rate_is_identity_for_random_berth() {
        let mut rng = SmallRng::seed_from_u64(42);
        let ops = GeneticOperators::default();
        let mut ch = BerthChromosome::new(vec![0, 1, 2]);
        ops.mutate(&mut ch, 3, 0.0, &mut rng);
        assert_eq!(ch.genes, vec![0, 1, 2]);
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = SmallRng::seed_from_u64(42);
        let population = vec![
            scored(vec![0], 1.0),
            scored(vec![1], 50.0),
            scored(vec![2], 10.0),
        ];
        // A tournament as large as the population almost always sees the best.
        let mut wins = 0;
        for _ in 0..100 {
            if tournament_select(&population, 10, &mut rng).fitness == 50.0 {
                wins += 1;
            }
        }
        assert!(wins > 90);

        // Size 1 is a uniform draw.
        let picked = tournament_select(&population, 1, &mut rng);
        assert!(population.contains(picked));
    }
}
