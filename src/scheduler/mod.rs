//! Greedy berth scheduler and KPI evaluation.
//!
//! # Algorithm
//!
//! `GreedyScheduler` uses a priority-driven, best-score-first heuristic.
//! It is not optimal, but is fast and deterministic, which suits
//! incremental re-planning after a single event.
//!
//! # KPI
//!
//! `AllocationKpi` computes allocation rate, score, waiting time and berth
//! utilization for a plan.
//!
//! # References
//!
//! - Imai, Nishimura & Papadimitriou (2001), "The dynamic berth allocation
//!   problem for a container port"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

mod greedy;
mod kpi;

pub use greedy::{GreedyScheduler, NO_FEASIBLE_BERTH, sort_vessels};
pub use kpi::AllocationKpi;
