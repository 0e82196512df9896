//! Port configuration.
//!
//! Scoring weights, soft-constraint penalties and policy thresholds are
//! deployment settings. The defaults are operating values carried over
//! from practice and are pending domain-expert review; none of them is
//! claimed to be optimal.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial JSON
//! document only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{GeoWindow, HOUR_MS};

/// Weights of the score components. Normalised by their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub physical_fit: f64,
    pub type_match: f64,
    pub waiting_time: f64,
    pub resources: f64,
    pub history: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            physical_fit: 25.0,
            type_match: 20.0,
            waiting_time: 30.0,
            resources: 15.0,
            history: 10.0,
        }
    }
}

impl ScoringWeights {
    /// Sum of all weights (negative weights count as zero).
    pub fn total(&self) -> f64 {
        [
            self.physical_fit,
            self.type_match,
            self.waiting_time,
            self.resources,
            self.history,
        ]
        .iter()
        .map(|w| w.max(0.0))
        .sum()
    }
}

/// Points deducted per soft violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftPenalties {
    pub cargo_mismatch: f64,
}

impl Default for SoftPenalties {
    fn default() -> Self {
        Self {
            cargo_mismatch: 15.0,
        }
    }
}

/// Multipliers applied to the waiting component for arrivals outside
/// normal working hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffHoursAdjustment {
    /// First working hour (inclusive, UTC).
    pub work_start_hour: u32,
    /// Last working hour (exclusive, UTC).
    pub work_end_hour: u32,
    /// Multiplier for arrivals outside working hours.
    pub night_factor: f64,
    /// Multiplier for weekend arrivals.
    pub weekend_factor: f64,
}

impl Default for OffHoursAdjustment {
    fn default() -> Self {
        Self {
            work_start_hour: 6,
            work_end_hour: 22,
            night_factor: 0.85,
            weekend_factor: 0.9,
        }
    }
}

/// Exclusive-use policy for hazardous and LNG vessels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowVesselPolicy {
    /// No other vessel may be at the berth this long before or after (ms).
    pub exclusion_buffer_ms: i64,
    /// First daylight hour (inclusive, UTC) for LNG arrivals.
    pub daylight_start_hour: u32,
    /// Last daylight hour (exclusive, UTC) for LNG arrivals.
    pub daylight_end_hour: u32,
    /// Zones hazardous vessels may berth in. Empty = no zone restriction.
    pub hazardous_zones: Vec<GeoWindow>,
}

impl Default for WindowVesselPolicy {
    fn default() -> Self {
        Self {
            exclusion_buffer_ms: HOUR_MS,
            daylight_start_hour: 6,
            daylight_end_hour: 18,
            hazardous_zones: Vec::new(),
        }
    }
}

/// Greedy scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyConfig {
    /// Top-scored feasible berths considered per vessel.
    pub candidate_limit: usize,
    /// Extra attempts with the window delayed by `shift_step_ms` each.
    pub max_shift_steps: u32,
    pub shift_step_ms: i64,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 5,
            max_shift_steps: 0,
            shift_step_ms: HOUR_MS,
        }
    }
}

/// Conflict engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    pub overlap_severity: u8,
    pub shortage_severity: u8,
    /// Pilot-requiring arrivals per hour tolerated when the pilot pool is
    /// not reported.
    pub pilot_concurrency: u32,
    /// Tug-requiring arrivals per hour tolerated when the tug pool is not
    /// reported. `None` = tugs are only checked against a reported pool.
    pub tug_concurrency: Option<u32>,
    /// Impact points per hour of delay.
    pub delay_impact_per_hour: f64,
    /// Base impact of moving a vessel to another berth.
    pub swap_base_impact: f64,
    /// Base impact of cutting a stay short.
    pub expedite_base_impact: f64,
    /// Impact points per hour of stay removed.
    pub expedite_impact_per_hour: f64,
    /// Shortest stay an expedited vessel may be left with (ms).
    pub min_dwell_ms: i64,
    /// Hours searched forward for spare pilot or tug capacity.
    pub reallocation_search_hours: u32,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            overlap_severity: 10,
            shortage_severity: 5,
            pilot_concurrency: 2,
            tug_concurrency: None,
            delay_impact_per_hour: 10.0,
            swap_base_impact: 15.0,
            expedite_base_impact: 20.0,
            expedite_impact_per_hour: 15.0,
            min_dwell_ms: 2 * HOUR_MS,
            reallocation_search_hours: 12,
        }
    }
}

/// Genetic search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    pub population_size: usize,
    pub max_generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Penalty per hard dimensional violation in a chromosome.
    pub hard_violation_penalty: f64,
    /// Penalty per extra vessel sharing a berth in a chromosome.
    pub double_booking_penalty: f64,
    /// Seed for the default RNG. `None` = entropy.
    pub seed: Option<u64>,
    /// Wall-clock budget checked at generation boundaries.
    #[serde(skip)]
    pub time_limit: Option<Duration>,
    /// Evaluate fitness in parallel.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            tournament_size: 3,
            elite_count: 1,
            hard_violation_penalty: 100.0,
            double_booking_penalty: 50.0,
            seed: None,
            time_limit: None,
            parallel: true,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Complete port configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Under-keel clearance buffer added to the draft (m).
    pub ukc_safety_margin: f64,
    pub weights: ScoringWeights,
    pub penalties: SoftPenalties,
    pub off_hours: OffHoursAdjustment,
    pub policy: WindowVesselPolicy,
    pub greedy: GreedyConfig,
    pub conflict: ConflictConfig,
    pub ga: GaConfig,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            ukc_safety_margin: 2.0,
            weights: ScoringWeights::default(),
            penalties: SoftPenalties::default(),
            off_hours: OffHoursAdjustment::default(),
            policy: WindowVesselPolicy::default(),
            greedy: GreedyConfig::default(),
            conflict: ConflictConfig::default(),
            ga: GaConfig::default(),
        }
    }
}

impl PortConfig {
    /// Default configuration with the standard 2.0 m UKC margin.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ukc_margin(mut self, margin_m: f64) -> Self {
        self.ukc_safety_margin = margin_m;
        self
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_greedy(mut self, greedy: GreedyConfig) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    pub fn with_policy(mut self, policy: WindowVesselPolicy) -> Self {
        self.policy = policy;
        self
    }
}
