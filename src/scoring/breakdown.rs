//! Score breakdown returned for every evaluated candidate.

use serde::{Deserialize, Serialize};

use crate::models::Violation;

/// Points earned per component, each within `[0, weight]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub physical_fit: f64,
    pub type_match: f64,
    pub waiting_time: f64,
    pub resources: f64,
    pub history: f64,
}

impl ComponentScores {
    /// Sum of component points.
    pub fn sum(&self) -> f64 {
        self.physical_fit + self.type_match + self.waiting_time + self.resources + self.history
    }
}

/// Explainable score of a vessel/berth/window candidate.
///
/// Always produced, also for infeasible candidates, so callers can show
/// why a berth was ranked low or rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Final score in [0, 100].
    pub total: f64,
    /// Weighted component points before normalisation.
    pub components: ComponentScores,
    /// Sum of configured weights used for normalisation.
    pub weight_total: f64,
    /// Points deducted for soft violations.
    pub soft_penalty: f64,
    /// Estimated wait between requested arrival and berth availability (ms).
    pub estimated_wait_ms: i64,
    /// No hard violation.
    pub is_feasible: bool,
    /// Violations the score was computed with.
    pub violations: Vec<Violation>,
}

/// A berth evaluated for a vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub berth_id: String,
    pub breakdown: ScoreBreakdown,
}

impl Candidate {
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.breakdown.is_feasible
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.breakdown.total
    }
}
