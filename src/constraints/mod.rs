//! Constraint validation for vessel/berth/window candidates.
//!
//! # Hard constraints (any failure = infeasible)
//! - `LOA_LIMIT`: vessel LOA <= berth max LOA
//! - `DRAFT_LIMIT`: vessel draft + UKC margin <= berth water depth
//! - `BEAM_LIMIT`: vessel beam <= berth max beam (when the berth has one)
//! - `BERTH_MAINTENANCE`: berth is open for the whole window
//! - `BERTH_OCCUPIED`: no active allocation at the berth overlaps the window
//! - `WINDOW_VESSEL_EXCLUSION`: a buffer stays clear on either side of a
//!   hazardous / LNG vessel's window, whichever of the two was booked first
//! - `DAYLIGHT_ONLY`: LNG arrivals fall within daylight hours
//! - `EXCLUSION_ZONE`: hazardous / LNG vessels berth inside a configured zone
//!
//! # Soft constraints (score penalty only)
//! - `CARGO_TYPE_MISMATCH`: see [`compatibility`]
//!
//! The validator is a pure function over the snapshots it is given.

mod compatibility;

pub use compatibility::{Compatibility, compatibility};

use crate::config::{PortConfig, SoftPenalties, WindowVesselPolicy};
use crate::models::{
    Allocation, Berth, CargoType, ConstraintName, MINUTE_MS, TimeWindow, Vessel, Violation,
    hour_of_day,
};

/// Checks hard and soft constraints between a vessel and a berth slot.
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    ukc_margin: f64,
    penalties: SoftPenalties,
    policy: WindowVesselPolicy,
}

impl ConstraintValidator {
    /// Creates a validator from the port configuration.
    pub fn new(config: &PortConfig) -> Self {
        Self {
            ukc_margin: config.ukc_safety_margin,
            penalties: config.penalties.clone(),
            policy: config.policy.clone(),
        }
    }

    /// UKC margin in use (m).
    pub fn ukc_margin(&self) -> f64 {
        self.ukc_margin
    }

    /// Runs every check.
    ///
    /// `existing` may contain any allocations; only active ones at
    /// `berth` belonging to other vessels are considered.
    pub fn validate(
        &self,
        vessel: &Vessel,
        berth: &Berth,
        window: &TimeWindow,
        existing: &[Allocation],
    ) -> Vec<Violation> {
        let mut violations = self.check_physical(vessel, berth);
        violations.extend(self.check_temporal(vessel, berth, window, existing));
        violations.extend(self.check_policy(vessel, berth, window));
        violations.extend(self.check_commercial(vessel, berth));
        violations
    }

    /// Dimensional checks only (LOA, draft + UKC, beam).
    pub fn check_physical(&self, vessel: &Vessel, berth: &Berth) -> Vec<Violation> {
        let mut violations = Vec::new();

        if vessel.loa_m > berth.max_loa_m {
            violations.push(Violation::hard(
                ConstraintName::LoaLimit,
                &berth.id,
                format!(
                    "vessel {} LOA {:.1} m exceeds berth {} max LOA {:.1} m",
                    vessel.id, vessel.loa_m, berth.id, berth.max_loa_m
                ),
            ));
        }

        let required_depth = vessel.draft_m + self.ukc_margin;
        if required_depth > berth.water_depth_m {
            violations.push(Violation::hard(
                ConstraintName::DraftLimit,
                &berth.id,
                format!(
                    "vessel {} draft {:.1} m + UKC {:.1} m = {:.1} m exceeds berth {} water depth {:.1} m",
                    vessel.id,
                    vessel.draft_m,
                    self.ukc_margin,
                    required_depth,
                    berth.id,
                    berth.water_depth_m
                ),
            ));
        }

        if let Some(max_beam) = berth.max_beam_m {
            if vessel.beam_m > max_beam {
                violations.push(Violation::hard(
                    ConstraintName::BeamLimit,
                    &berth.id,
                    format!(
                        "vessel {} beam {:.1} m exceeds berth {} max beam {:.1} m",
                        vessel.id, vessel.beam_m, berth.id, max_beam
                    ),
                ));
            }
        }

        violations
    }

    /// Maintenance and occupancy checks for a window.
    pub fn check_temporal(
        &self,
        vessel: &Vessel,
        berth: &Berth,
        window: &TimeWindow,
        existing: &[Allocation],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        if berth.is_under_maintenance(window) {
            violations.push(Violation::hard(
                ConstraintName::BerthMaintenance,
                &berth.id,
                format!(
                    "berth {} is under maintenance during [{}, {})",
                    berth.id, window.start_ms, window.end_ms
                ),
            ));
        }

        let mut occupied = false;
        for a in others_at(existing, &berth.id, &vessel.id).filter(|a| a.window.overlaps(window)) {
            occupied = true;
            violations.push(Violation::hard(
                ConstraintName::BerthOccupied,
                &berth.id,
                format!(
                    "berth {} is allocated to vessel {} during [{}, {})",
                    berth.id, a.vessel_id, a.window.start_ms, a.window.end_ms
                ),
            ));
        }

        let buffer = self.policy.exclusion_buffer_ms;
        if !occupied && buffer > 0 {
            let buffered = window.padded(buffer);
            let neighbour = others_at(existing, &berth.id, &vessel.id)
                .filter(|a| vessel.is_window_vessel() || a.window_vessel)
                .find(|a| a.window.overlaps(&buffered));
            if let Some(a) = neighbour {
                let guarded = if vessel.is_window_vessel() {
                    vessel.id.as_str()
                } else {
                    a.vessel_id.as_str()
                };
                violations.push(Violation::hard(
                    ConstraintName::WindowVesselExclusion,
                    &berth.id,
                    format!(
                        "berth {} must stay clear {} min either side of window vessel {}; vessel {} is at [{}, {})",
                        berth.id,
                        buffer / MINUTE_MS,
                        guarded,
                        a.vessel_id,
                        a.window.start_ms,
                        a.window.end_ms
                    ),
                ));
            }
        }

        violations
    }

    /// Window-vessel policy checks that don't depend on other allocations.
    pub fn check_policy(&self, vessel: &Vessel, berth: &Berth, window: &TimeWindow) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !vessel.is_window_vessel() {
            return violations;
        }

        if vessel.cargo_type == CargoType::Lng {
            let hour = hour_of_day(window.start_ms);
            if hour < self.policy.daylight_start_hour || hour >= self.policy.daylight_end_hour {
                violations.push(Violation::hard(
                    ConstraintName::DaylightOnly,
                    &berth.id,
                    format!(
                        "LNG vessel {} arrives at {:02}:00 UTC, outside daylight hours {:02}:00-{:02}:00",
                        vessel.id,
                        hour,
                        self.policy.daylight_start_hour,
                        self.policy.daylight_end_hour
                    ),
                ));
            }
        }

        if !self.policy.hazardous_zones.is_empty() {
            let inside = berth
                .geo_window
                .as_ref()
                .is_some_and(|g| self.policy.hazardous_zones.iter().any(|z| z.encloses(g)));
            if !inside {
                violations.push(Violation::hard(
                    ConstraintName::ExclusionZone,
                    &berth.id,
                    format!(
                        "berth {} is outside every zone approved for hazardous vessel {}",
                        berth.id, vessel.id
                    ),
                ));
            }
        }

        violations
    }

    /// Commercial (soft) checks.
    pub fn check_commercial(&self, vessel: &Vessel, berth: &Berth) -> Vec<Violation> {
        match compatibility(&vessel.cargo_type, &berth.specialization) {
            Compatibility::Mismatch => vec![Violation::soft(
                ConstraintName::CargoTypeMismatch,
                &berth.id,
                format!(
                    "{} cargo of vessel {} does not match {} berth {}",
                    vessel.cargo_type, vessel.id, berth.specialization, berth.id
                ),
                self.penalties.cargo_mismatch,
            )],
            _ => Vec::new(),
        }
    }
}

/// Active allocations with the window-vessel flag set from `vessels`.
///
/// Allocations of vessels missing from `vessels` keep their own flag.
pub fn mark_window_vessels(existing: &[Allocation], vessels: &[Vessel]) -> Vec<Allocation> {
    existing
        .iter()
        .filter(|a| a.is_active())
        .map(|a| {
            let flagged = vessels
                .iter()
                .find(|v| v.id == a.vessel_id)
                .is_some_and(Vessel::is_window_vessel);
            a.clone().with_window_vessel(a.window_vessel || flagged)
        })
        .collect()
}

/// Active allocations at a berth held by other vessels.
fn others_at<'a>(
    existing: &'a [Allocation],
    berth_id: &'a str,
    vessel_id: &'a str,
) -> impl Iterator<Item = &'a Allocation> + 'a {
    existing
        .iter()
        .filter(move |a| a.is_active() && a.berth_id == berth_id && a.vessel_id != vessel_id)
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new(&PortConfig::default())
    }
}
