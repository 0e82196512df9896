//! Allocation quality metrics (KPIs).
//!
//! Computes berth-planning performance indicators from an allocation
//! result and its input vessels.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Allocation rate | Allocated / (allocated + unallocated) |
//! | Mean score | Mean allocation score (0-100) |
//! | Mean wait | Mean max(0, berth start - arrival) |
//! | Max wait | Largest single wait |
//! | Utilization | Busy time / plan horizon, per berth |
//!
//! # Reference
//! Bierwirth & Meisel (2010), "A survey of berth allocation and quay crane
//! scheduling problems in container terminals", Sec. 2

use std::collections::HashMap;

use crate::models::{AllocationResult, Berth, Vessel};

/// Allocation performance indicators.
///
/// All time values are in milliseconds.
#[derive(Debug, Clone)]
pub struct AllocationKpi {
    /// Fraction of requested vessels that received a berth (0.0..1.0).
    pub allocation_rate: f64,
    /// Mean score of the allocations.
    pub mean_score: f64,
    /// Mean wait between arrival and berth start (ms).
    pub mean_wait_ms: f64,
    /// Largest wait of any allocated vessel (ms).
    pub max_wait_ms: i64,
    /// Horizon length: earliest start to latest end (ms).
    pub horizon_ms: i64,
    /// Busy share of the horizon per berth.
    pub utilization_by_berth: HashMap<String, f64>,
    /// Mean utilization across berths.
    pub avg_utilization: f64,
}

impl AllocationKpi {
    /// Computes KPIs from an allocation result.
    ///
    /// # Arguments
    /// * `result` - Output of a planning pass.
    /// * `vessels` - The vessels (for arrival times).
    /// * `berths` - Every berth, so idle berths count as 0 utilization.
    pub fn calculate(result: &AllocationResult, vessels: &[Vessel], berths: &[Berth]) -> Self {
        let arrivals: HashMap<&str, i64> = vessels
            .iter()
            .map(|v| (v.id.as_str(), v.arrival_ms()))
            .collect();

        let allocated = result.allocated.len();
        let requested = allocated + result.unallocated.len();
        let allocation_rate = if requested == 0 {
            1.0
        } else {
            allocated as f64 / requested as f64
        };

        let mut total_score = 0.0;
        let mut total_wait: i64 = 0;
        let mut max_wait: i64 = 0;
        for a in &result.allocated {
            total_score += a.score;
            if let Some(&arrival) = arrivals.get(a.vessel_id.as_str()) {
                let wait = (a.window.start_ms - arrival).max(0);
                total_wait += wait;
                max_wait = max_wait.max(wait);
            }
        }

        let (mean_score, mean_wait_ms) = if allocated == 0 {
            (0.0, 0.0)
        } else {
            (
                total_score / allocated as f64,
                total_wait as f64 / allocated as f64,
            )
        };

        let horizon_ms = match (
            result.allocated.iter().map(|a| a.window.start_ms).min(),
            result.allocated.iter().map(|a| a.window.end_ms).max(),
        ) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        };

        let mut busy: HashMap<String, i64> =
            berths.iter().map(|b| (b.id.clone(), 0)).collect();
        for a in &result.allocated {
            *busy.entry(a.berth_id.clone()).or_insert(0) += a.window.duration_ms();
        }
        let utilization_by_berth: HashMap<String, f64> = busy
            .into_iter()
            .map(|(id, ms)| {
                let u = if horizon_ms > 0 {
                    ms as f64 / horizon_ms as f64
                } else {
                    0.0
                };
                (id, u)
            })
            .collect();
        let avg_utilization = if utilization_by_berth.is_empty() {
            0.0
        } else {
            utilization_by_berth.values().sum::<f64>() / utilization_by_berth.len() as f64
        };

        Self {
            allocation_rate,
            mean_score,
            mean_wait_ms,
            max_wait_ms: max_wait,
            horizon_ms,
            utilization_by_berth,
            avg_utilization,
        }
    }

    /// Whether the plan meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_allocation_rate: f64, max_wait_ms: i64) -> bool {
        self.allocation_rate >= min_allocation_rate && self.max_wait_ms <= max_wait_ms
    }
}
