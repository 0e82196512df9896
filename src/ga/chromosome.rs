//! Berth assignment chromosome.
//!
//! # Encoding
//!
//! One gene per vessel: the index of the assigned berth in the berth list.
//! Windows are not encoded; the decoder uses each vessel's requested window.
//!
//! # Reference
//! Nishimura, Imai & Papadimitriou (2001), "Berth allocation planning in the
//! public berth system by genetic algorithms"

use rand::Rng;
use rand::prelude::IndexedRandom;

use super::runner::Individual;

/// Vessel → berth index assignment.
///
/// Higher fitness = better plan (maximisation convention).
#[derive(Debug, Clone, PartialEq)]
pub struct BerthChromosome {
    /// Berth index per vessel.
    pub genes: Vec<usize>,
    /// Fitness value (higher = better).
    pub fitness: f64,
}

impl Individual for BerthChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl BerthChromosome {
    /// Wraps genes with an unevaluated fitness.
    pub fn new(genes: Vec<usize>) -> Self {
        Self {
            genes,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Uniformly random berth per vessel.
    pub fn random<R: Rng>(vessel_count: usize, berth_count: usize, rng: &mut R) -> Self {
        let genes = (0..vessel_count)
            .map(|_| random_berth(berth_count, rng))
            .collect();
        Self::new(genes)
    }

    /// Random berth among the physically feasible ones per vessel.
    ///
    /// Vessels with no feasible berth get a uniformly random one.
    pub fn feasible_biased<R: Rng>(feasible: &[Vec<usize>], berth_count: usize, rng: &mut R) -> Self {
        let genes = feasible
            .iter()
            .map(|options| match options.choose(rng) {
                Some(&b) => b,
                None => random_berth(berth_count, rng),
            })
            .collect();
        Self::new(genes)
    }

    /// Number of vessels.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether every gene is a valid berth index.
    pub fn is_valid(&self, vessel_count: usize, berth_count: usize) -> bool {
        self.genes.len() == vessel_count && self.genes.iter().all(|&g| g < berth_count)
    }
}

fn random_berth<R: Rng>(berth_count: usize, rng: &mut R) -> usize {
    if berth_count == 0 {
        0
    } else {
        rng.random_range(0..berth_count)
    }
}

// ======================== Crossover Operators ========================

/// Single-point crossover.
///
/// Cuts both parents at one random point and exchanges the tails.
pub fn single_point_crossover<R: Rng>(
    p1: &BerthChromosome,
    p2: &BerthChromosome,
    rng: &mut R,
) -> (BerthChromosome, BerthChromosome) {
    let n = p1.genes.len().min(p2.genes.len());
    if n < 2 {
        return (
            BerthChromosome::new(p1.genes.clone()),
            BerthChromosome::new(p2.genes.clone()),
        );
    }

    let cut = rng.random_range(1..n);
    let mut c1 = p1.genes[..cut].to_vec();
    c1.extend_from_slice(&p2.genes[cut..]);
    let mut c2 = p2.genes[..cut].to_vec();
    c2.extend_from_slice(&p1.genes[cut..]);

    (BerthChromosome::new(c1), BerthChromosome::new(c2))
}

/// Uniform crossover: each gene comes from either parent with equal odds.
pub fn uniform_crossover<R: Rng>(
    p1: &BerthChromosome,
    p2: &BerthChromosome,
    rng: &mut R,
) -> (BerthChromosome, BerthChromosome) {
    let mut c1 = p1.genes.clone();
    let mut c2 = p2.genes.clone();
    for i in 0..c1.len().min(c2.len()) {
        if rng.random_bool(0.5) {
            std::mem::swap(&mut c1[i], &mut c2[i]);
        }
    }
    (BerthChromosome::new(c1), BerthChromosome::new(c2))
}

// ======================== Mutation Operators ========================

/// Per-gene random-berth mutation.
///
/// Each gene is replaced by a uniformly random berth with probability `rate`.
pub fn random_berth_mutation<R: Rng>(
    chromosome: &mut BerthChromosome,
    berth_count: usize,
    rate: f64,
    rng: &mut R,
) {
    if berth_count == 0 {
        return;
    }
    let rate = rate.clamp(0.0, 1.0);
    for gene in chromosome.genes.iter_mut() {
        if rng.random_bool(rate) {
            *gene = rng.random_range(0..berth_count);
        }
    }
}

/// Swap mutation: exchanges the berths of two random vessels.
pub fn swap_mutation<R: Rng>(chromosome: &mut BerthChromosome, rng: &mut R) {
    let n = chromosome.genes.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    chromosome.genes.swap(i, j);
}
