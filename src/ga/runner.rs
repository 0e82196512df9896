//! Generational GA loop.
//!
//! # Algorithm
//!
//! 1. Create and evaluate the initial population.
//! 2. Per generation: copy the elites, fill the rest by tournament
//!    selection, crossover (with probability `crossover_rate`) and
//!    mutation, then evaluate the new population.
//! 3. Track the best individual ever seen.
//!
//! Fitness evaluation is parallel per individual when `parallel` is set;
//! the generation completes before the next selection. All randomness is
//! drawn from the caller's RNG on the calling thread, so a seeded run
//! gives the same result on any number of threads.
//!
//! The time limit and stop flag are checked at each generation boundary.
//! Hitting either returns the best individual so far.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::operators::tournament_select;
use crate::config::GaConfig;

/// A member of the population. Higher fitness is better.
pub trait Individual: Clone + Send + Sync {
    fn fitness(&self) -> f64;
    fn set_fitness(&mut self, fitness: f64);
}

/// Problem definition driven by [`GaRunner`].
pub trait GaProblem: Sync {
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Computes the fitness of an individual. Must be pure.
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Recombines two parents into two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> (Self::Individual, Self::Individual);

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Ran every configured generation.
    Completed,
    /// Stopped early by the time limit or the stop flag.
    BudgetExceeded,
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaOutcome<I> {
    /// Best individual ever seen.
    pub best: I,
    /// Generations completed after the initial population.
    pub generations: usize,
    pub termination: Termination,
}

/// Runs the generational loop for a [`GaProblem`].
#[derive(Debug, Clone, Default)]
pub struct GaRunner {
    config: GaConfig,
    stop: Option<Arc<AtomicBool>>,
}

impl GaRunner {
    pub fn new(config: GaConfig) -> Self {
        Self { config, stop: None }
    }

    /// Sets a cooperative stop flag.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the search.
    pub fn run<P: GaProblem, R: Rng>(&self, problem: &P, rng: &mut R) -> GaOutcome<P::Individual> {
        let started = Instant::now();
        let size = self.config.population_size.max(1);
        let elites = self.config.elite_count.min(size);
        let crossover_rate = self.config.crossover_rate.clamp(0.0, 1.0);

        let mut population: Vec<P::Individual> =
            (0..size).map(|_| problem.create_individual(rng)).collect();
        self.evaluate(problem, &mut population);
        sort_by_fitness(&mut population);
        let mut best = population[0].clone();

        let mut generations = 0;
        let mut termination = Termination::Completed;

        for generation in 0..self.config.max_generations {
            if self.budget_exhausted(started) {
                warn!(generation, best = best.fitness(), "GA budget exhausted");
                termination = Termination::BudgetExceeded;
                break;
            }

            let mut next: Vec<P::Individual> = population[..elites].to_vec();
            while next.len() < size {
                let p1 = tournament_select(&population, self.config.tournament_size, rng);
                let p2 = tournament_select(&population, self.config.tournament_size, rng);
                let (mut c1, mut c2) = if rng.random_bool(crossover_rate) {
                    problem.crossover(p1, p2, rng)
                } else {
                    (p1.clone(), p2.clone())
                };
                problem.mutate(&mut c1, rng);
                problem.mutate(&mut c2, rng);
                next.push(c1);
                if next.len() < size {
                    next.push(c2);
                }
            }

            self.evaluate(problem, &mut next);
            sort_by_fitness(&mut next);
            population = next;
            generations += 1;

            if population[0].fitness() > best.fitness() {
                best = population[0].clone();
                debug!(generation, fitness = best.fitness(), "new best");
            }
        }

        GaOutcome {
            best,
            generations,
            termination,
        }
    }

    fn evaluate<P: GaProblem>(&self, problem: &P, population: &mut [P::Individual]) {
        if self.config.parallel {
            population
                .par_iter_mut()
                .for_each(|ind| ind.set_fitness(problem.evaluate(ind)));
        } else {
            for ind in population.iter_mut() {
                ind.set_fitness(problem.evaluate(ind));
            }
        }
    }

    fn budget_exhausted(&self, started: Instant) -> bool {
        if self
            .stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return true;
        }
        self.config
            .time_limit
            .is_some_and(|limit| started.elapsed() >= limit)
    }
}

/// Sorts fittest first. Stable, so equal individuals keep creation order.
fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
}
