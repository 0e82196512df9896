//! Multi-factor scoring of berth candidates.
//!
//! # Components (default weights)
//!
//! | Component | Weight | Basis |
//! |-----------|--------|-------|
//! | Physical fit | 25 | Tightest dimensional margin, triangular credit |
//! | Type match | 20 | Cargo/specialization table |
//! | Waiting time | 30 | Occupancy and queue at the berth, off-hours table |
//! | Resources | 15 | Free share of required pilots, tugs and cranes |
//! | History | 10 | Past calls of the vessel at the berth |
//!
//! Each component earns `credit * weight` with `credit` clamped to [0, 1].
//! The total is normalised by the weight sum, soft penalties are deducted
//! and the result is clamped to [0, 100].

mod breakdown;
mod context;

pub use breakdown::{Candidate, ComponentScores, ScoreBreakdown};
pub use context::ScoringContext;

use crate::config::{OffHoursAdjustment, PortConfig, ScoringWeights};
use crate::constraints::{ConstraintValidator, compatibility};
use crate::models::{
    Allocation, Berth, ResourceKind, TimeWindow, Vessel, ViolationKind, Violation, defaults,
    has_hard, hour_of_day, is_weekend,
};

/// Lower edge of the ideal margin band.
const TIGHT_MARGIN: f64 = 0.10;
/// Upper edge of the ideal margin band.
const LOOSE_MARGIN: f64 = 0.30;
/// Credit floor for heavily oversized berths.
const OVERSIZE_FLOOR: f64 = 0.4;

/// Scores vessel/berth/window candidates.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: ScoringWeights,
    off_hours: OffHoursAdjustment,
    validator: ConstraintValidator,
}

impl ScoringEngine {
    /// Creates an engine with a validator built from the same config.
    pub fn new(config: &PortConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            off_hours: config.off_hours.clone(),
            validator: ConstraintValidator::new(config),
        }
    }

    /// Replaces the validator.
    pub fn with_validator(mut self, validator: ConstraintValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn validator(&self) -> &ConstraintValidator {
        &self.validator
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores a candidate given its violations.
    pub fn score(
        &self,
        vessel: &Vessel,
        berth: &Berth,
        window: &TimeWindow,
        violations: &[Violation],
        existing: &[Allocation],
        ctx: &ScoringContext,
    ) -> ScoreBreakdown {
        let w = &self.weights;
        let estimated_wait_ms = estimate_wait_ms(vessel, berth, window, existing, ctx);

        let components = ComponentScores {
            physical_fit: weighted(self.physical_fit(vessel, berth, violations), w.physical_fit),
            type_match: weighted(
                compatibility(&vessel.cargo_type, &berth.specialization).score(),
                w.type_match,
            ),
            waiting_time: weighted(
                self.waiting_credit(estimated_wait_ms, window.start_ms),
                w.waiting_time,
            ),
            resources: weighted(resource_credit(vessel, berth, ctx), w.resources),
            history: weighted(history_credit(vessel, berth, ctx), w.history),
        };

        let soft_penalty: f64 = violations
            .iter()
            .filter(|v| v.kind == ViolationKind::Soft)
            .map(|v| v.penalty.max(0.0))
            .sum();

        let weight_total = w.total();
        let normalised = if weight_total > 0.0 {
            components.sum() / weight_total * 100.0
        } else {
            0.0
        };
        let total = normalised - soft_penalty;
        let total = if total.is_finite() {
            total.clamp(0.0, 100.0)
        } else {
            0.0
        };

        ScoreBreakdown {
            total,
            components,
            weight_total,
            soft_penalty,
            estimated_wait_ms,
            is_feasible: !has_hard(violations),
            violations: violations.to_vec(),
        }
    }

    /// Validates and scores one berth.
    pub fn evaluate(
        &self,
        vessel: &Vessel,
        berth: &Berth,
        window: &TimeWindow,
        existing: &[Allocation],
        ctx: &ScoringContext,
    ) -> Candidate {
        let violations = self.validator.validate(vessel, berth, window, existing);
        Candidate {
            berth_id: berth.id.clone(),
            breakdown: self.score(vessel, berth, window, &violations, existing, ctx),
        }
    }

    /// Fast variant that ignores time windows: dimensional, policy-free
    /// and commercial checks only, no occupancy.
    ///
    /// Used to pre-compute the vessel × berth matrix for the genetic search.
    pub fn evaluate_static(&self, vessel: &Vessel, berth: &Berth, ctx: &ScoringContext) -> Candidate {
        let window = vessel.requested_window();
        let mut violations = self.validator.check_physical(vessel, berth);
        violations.extend(self.validator.check_commercial(vessel, berth));
        Candidate {
            berth_id: berth.id.clone(),
            breakdown: self.score(vessel, berth, &window, &violations, &[], ctx),
        }
    }

    /// Evaluates every berth for a vessel.
    ///
    /// Feasible candidates come first, by descending score; ties are broken
    /// by berth ID so the order is deterministic.
    pub fn rank_berths(
        &self,
        vessel: &Vessel,
        berths: &[Berth],
        window: &TimeWindow,
        existing: &[Allocation],
        ctx: &ScoringContext,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = berths
            .iter()
            .map(|b| self.evaluate(vessel, b, window, existing, ctx))
            .collect();
        sort_candidates(&mut candidates);
        candidates
    }

    fn physical_fit(&self, vessel: &Vessel, berth: &Berth, violations: &[Violation]) -> f64 {
        if violations
            .iter()
            .any(|v| v.is_hard() && v.constraint.is_dimensional())
        {
            return 0.0;
        }

        let mut margin = margin_ratio(berth.max_loa_m, vessel.loa_m);
        margin = margin.min(margin_ratio(
            berth.water_depth_m,
            vessel.draft_m + self.validator.ukc_margin(),
        ));
        if let Some(max_beam) = berth.max_beam_m {
            margin = margin.min(margin_ratio(max_beam, vessel.beam_m));
        }
        margin_credit(margin)
    }

    fn waiting_credit(&self, wait_ms: i64, arrival_ms: i64) -> f64 {
        let reference = defaults::REFERENCE_WAIT_MS as f64;
        let mut credit = 1.0 / (1.0 + wait_ms.max(0) as f64 / reference);

        let hour = hour_of_day(arrival_ms);
        if hour < self.off_hours.work_start_hour || hour >= self.off_hours.work_end_hour {
            credit *= self.off_hours.night_factor;
        }
        if is_weekend(arrival_ms) {
            credit *= self.off_hours.weekend_factor;
        }
        credit
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(&PortConfig::default())
    }
}

/// Orders candidates: feasible first, then score descending, then berth ID.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.is_feasible()
            .cmp(&a.is_feasible())
            .then_with(|| b.total().total_cmp(&a.total()))
            .then_with(|| a.berth_id.cmp(&b.berth_id))
    });
}

#[inline]
fn weighted(credit: f64, weight: f64) -> f64 {
    let credit = if credit.is_finite() {
        credit.clamp(0.0, 1.0)
    } else {
        0.0
    };
    credit * weight.max(0.0)
}

/// Spare share of a limit: `(limit - value) / limit`.
fn margin_ratio(limit: f64, value: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    (limit - value) / limit
}

/// Triangular credit over the margin ratio.
///
/// Full credit in the 10-30 % band, linear ramp from 0.5 below it, and a
/// slow decline towards [`OVERSIZE_FLOOR`] above it.
fn margin_credit(margin: f64) -> f64 {
    if margin < 0.0 {
        0.0
    } else if margin < TIGHT_MARGIN {
        0.5 + 0.5 * margin / TIGHT_MARGIN
    } else if margin <= LOOSE_MARGIN {
        1.0
    } else {
        let excess = (margin - LOOSE_MARGIN) / (1.0 - LOOSE_MARGIN);
        (1.0 - excess * (1.0 - OVERSIZE_FLOOR)).max(OVERSIZE_FLOOR)
    }
}

/// Wait until the berth is free plus the queue ahead of the vessel.
fn estimate_wait_ms(
    vessel: &Vessel,
    berth: &Berth,
    window: &TimeWindow,
    existing: &[Allocation],
    ctx: &ScoringContext,
) -> i64 {
    let busy_until = existing
        .iter()
        .filter(|a| a.is_active() && a.berth_id == berth.id && a.vessel_id != vessel.id)
        .filter(|a| a.window.contains(window.start_ms))
        .map(|a| a.window.end_ms)
        .max()
        .unwrap_or(window.start_ms);
    let occupancy_wait = (busy_until - window.start_ms).max(0);
    occupancy_wait + ctx.queue_at(&berth.id) as i64 * defaults::QUEUE_SLOT_MS
}

fn resource_credit(vessel: &Vessel, berth: &Berth, ctx: &ScoringContext) -> f64 {
    let mut ratios = Vec::with_capacity(3);

    for (kind, needed) in [
        (ResourceKind::Pilot, vessel.pilots_needed()),
        (ResourceKind::Tug, vessel.tugs_needed()),
    ] {
        if needed == 0 {
            continue;
        }
        if let Some(free) = ctx.resources.pool(kind) {
            ratios.push((free as f64 / needed as f64).min(1.0));
        }
    }

    let cranes = vessel.cranes_needed();
    if cranes > 0 {
        let free = ctx.resources.cranes_available(berth);
        ratios.push((free as f64 / cranes as f64).min(1.0));
    }

    if ratios.is_empty() {
        1.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}

fn history_credit(vessel: &Vessel, berth: &Berth, ctx: &ScoringContext) -> f64 {
    match ctx.visits(&vessel.id, &berth.id) {
        0 => defaults::NEUTRAL_HISTORY_SCORE,
        n => (0.6 + 0.1 * n as f64).min(1.0),
    }
}
