//! GA-based berth allocation.
//!
//! Global re-optimization over a batch of vessels for full-horizon
//! re-plans, e.g. after a berth closure. Trades compute time for a better
//! aggregate plan than the greedy pass.
//!
//! # Encoding
//!
//! A chromosome maps each vessel index to a berth index. Fitness uses
//! pre-computed static scores and ignores windows; the best chromosome is
//! re-validated with exact windows before it is returned.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//!
//! # Reference
//! - Nishimura, Imai & Papadimitriou (2001), "Berth allocation planning in
//!   the public berth system by genetic algorithms"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning", Ch. 3

mod chromosome;
pub mod operators;
mod optimizer;
mod problem;
mod runner;

pub use chromosome::{
    BerthChromosome, random_berth_mutation, single_point_crossover, swap_mutation,
    uniform_crossover,
};
pub use optimizer::{BerthOptimizer, FAILED_REVALIDATION, OptimizationResult};
pub use problem::{BerthGaProblem, PairScore};
pub use runner::{GaOutcome, GaProblem, GaRunner, Individual, Termination};
