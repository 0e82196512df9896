//! Resolution proposals for detected conflicts.
//!
//! # Temporal overlap
//!
//! Proposed in this order, then ranked by impact (stable):
//! 1. `TimeShift`: delay the lower-ranked vessel until the other leaves.
//! 2. `BerthSwap`: move the lower-ranked vessel to another feasible berth.
//! 3. `PriorityOverride`: end the higher-ranked vessel's stay when the
//!    other arrives, if at least `min_dwell_ms` remains.
//!
//! Rank is priority ordinal, then earlier start, then smaller ID.
//!
//! # Resource shortage
//!
//! `ResourceReallocation`: move the lowest-ranked arrivals, until the hour
//! is back within capacity, each to the next hour whose demand leaves room
//! for it.
//!
//! Every proposal is checked against the hard constraints that do not
//! depend on other allocations. Overlaps the change would create are
//! reported as cascading effects and add to the impact.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{ShortageRule, Snapshot};
use crate::config::ConflictConfig;
use crate::models::{
    Allocation, Berth, CascadingEffect, Conflict, HOUR_MS, ProposedChange, Resolution,
    ResolutionStrategy, TimeWindow, Vessel, Violation,
};
use crate::scoring::{ScoringContext, ScoringEngine};

const MAX_IMPACT: f64 = 100.0;

/// Builds resolutions against one frozen allocation snapshot.
pub(super) struct Proposer<'a> {
    pub scoring: &'a ScoringEngine,
    pub config: &'a ConflictConfig,
    pub snapshot: &'a Snapshot<'a>,
    pub ctx: &'a ScoringContext,
    /// Active allocations of the scanned set.
    pub active: &'a [Allocation],
}

impl Proposer<'_> {
    /// Fills resolutions (or diagnostics) of a temporal overlap.
    pub fn resolve_overlap(&self, conflict: &mut Conflict) {
        let [a, b] = conflict.allocation_ids.as_slice() else {
            return;
        };
        let (Some(a), Some(b)) = (self.find(a), self.find(b)) else {
            return;
        };
        let (hi, lo) = if self.rank_key(a) <= self.rank_key(b) {
            (a, b)
        } else {
            (b, a)
        };

        let mut proposals = Vec::new();
        let mut rejected = Vec::new();

        if let Some((vessel, berth)) = self.resolve(lo) {
            // Delay the lower-ranked vessel.
            let window = lo.window.starting_at(hi.window.end_ms);
            let hard = self.hard_violations(vessel, berth, &window);
            if hard.is_empty() {
                let cascading = self.cascading(lo, &berth.id, &window);
                let hours = (window.start_ms - lo.window.start_ms) as f64 / HOUR_MS as f64;
                let impact = hours * self.config.delay_impact_per_hour;
                proposals.push(self.proposal(
                    ResolutionStrategy::TimeShift,
                    lo,
                    &berth.id,
                    window,
                    impact,
                    cascading,
                    format!(
                        "delay {} at berth {} until {} ({hours:.1} h)",
                        lo.vessel_id,
                        berth.id,
                        fmt_instant(window.start_ms)
                    ),
                ));
            } else {
                rejected.extend(hard);
            }

            // Move it elsewhere.
            let original = self.scoring.evaluate_static(vessel, berth, self.ctx).total();
            for other in self.snapshot.berths_sorted() {
                if other.id == lo.berth_id {
                    continue;
                }
                let candidate = self
                    .scoring
                    .evaluate(vessel, other, &lo.window, self.active, self.ctx);
                if !candidate.is_feasible() {
                    rejected.extend(candidate.breakdown.violations.into_iter().filter(|v| v.is_hard()));
                    continue;
                }
                let replacement = self.scoring.evaluate_static(vessel, other, self.ctx).total();
                let impact = self.config.swap_base_impact + (original - replacement).max(0.0);
                proposals.push(self.proposal(
                    ResolutionStrategy::BerthSwap,
                    lo,
                    &other.id,
                    lo.window,
                    impact,
                    Vec::new(),
                    format!(
                        "move {} from berth {} to berth {}",
                        lo.vessel_id, lo.berth_id, other.id
                    ),
                ));
            }
        }

        if let Some((vessel, berth)) = self.resolve(hi) {
            // Cut the higher-ranked vessel's stay short.
            let kept = lo.window.start_ms - hi.window.start_ms;
            if kept >= self.config.min_dwell_ms && lo.window.start_ms < hi.window.end_ms {
                let window = TimeWindow::new(hi.window.start_ms, lo.window.start_ms);
                let hard = self.hard_violations(vessel, berth, &window);
                if hard.is_empty() {
                    let cascading = self.cascading(hi, &berth.id, &window);
                    let hours = (hi.window.end_ms - window.end_ms) as f64 / HOUR_MS as f64;
                    let impact = self.config.expedite_base_impact
                        + hours * self.config.expedite_impact_per_hour;
                    proposals.push(self.proposal(
                        ResolutionStrategy::PriorityOverride,
                        hi,
                        &berth.id,
                        window,
                        impact,
                        cascading,
                        format!(
                            "expedite departure of {} at berth {} to {}",
                            hi.vessel_id,
                            berth.id,
                            fmt_instant(window.end_ms)
                        ),
                    ));
                } else {
                    rejected.extend(hard);
                }
            }
        }

        self.finish(conflict, proposals, rejected);
    }

    /// Fills resolutions (or diagnostics) of a resource shortage.
    ///
    /// `load` holds the demand per arrival hour (start ms) under `rule`.
    pub fn resolve_shortage(
        &self,
        conflict: &mut Conflict,
        rule: &ShortageRule,
        load: &BTreeMap<i64, u32>,
    ) {
        let hour = conflict.window.start_ms;
        let capacity = rule.capacity();
        let noun = rule.kind().noun();
        let mut members: Vec<(&Allocation, u32)> = conflict
            .allocation_ids
            .iter()
            .filter_map(|id| self.find(id))
            .map(|a| (a, rule.demand(self.snapshot, &a.vessel_id)))
            .collect();
        // Lowest-ranked first.
        members.sort_by(|x, y| self.rank_key(y.0).cmp(&self.rank_key(x.0)));

        let mut remaining = load.get(&hour).copied().unwrap_or(0);
        let mut planned: BTreeMap<i64, u32> = BTreeMap::new();
        let mut proposals = Vec::new();
        let mut rejected = Vec::new();

        for (a, demand) in members {
            if remaining <= capacity {
                break;
            }
            remaining = remaining.saturating_sub(demand);
            let Some((vessel, berth)) = self.resolve(a) else {
                continue;
            };
            let mut placed = false;
            for k in 1..=i64::from(self.config.reallocation_search_hours) {
                let target = hour.saturating_add(k * HOUR_MS);
                let used = load
                    .get(&target)
                    .copied()
                    .unwrap_or(0)
                    .saturating_add(planned.get(&target).copied().unwrap_or(0));
                if used.saturating_add(demand) > capacity {
                    continue;
                }
                let window = a.window.shifted(k * HOUR_MS);
                let hard = self.hard_violations(vessel, berth, &window);
                if !hard.is_empty() {
                    rejected.extend(hard);
                    continue;
                }
                let cascading = self.cascading(a, &berth.id, &window);
                proposals.push(self.proposal(
                    ResolutionStrategy::ResourceReallocation,
                    a,
                    &berth.id,
                    window,
                    k as f64 * self.config.delay_impact_per_hour,
                    cascading,
                    format!(
                        "move arrival of {} to {} for {noun} capacity",
                        a.vessel_id,
                        fmt_instant(window.start_ms)
                    ),
                ));
                *planned.entry(target).or_insert(0) += demand;
                placed = true;
                break;
            }
            if !placed {
                rejected.push(Violation::hard(
                    rule.constraint(),
                    &a.vessel_id,
                    format!(
                        "no hour within {} h after {} has {noun} capacity for {} ({demand} needed, {capacity} per hour)",
                        self.config.reallocation_search_hours,
                        fmt_instant(hour),
                        a.vessel_id
                    ),
                ));
            }
        }

        self.finish(conflict, proposals, rejected);
    }

    fn finish(&self, conflict: &mut Conflict, mut proposals: Vec<Resolution>, rejected: Vec<Violation>) {
        proposals.sort_by(|x, y| x.impact_score.total_cmp(&y.impact_score));
        if proposals.is_empty() {
            conflict.diagnostics = rejected;
        }
        conflict.resolutions = proposals;
    }

    #[allow(clippy::too_many_arguments)]
    fn proposal(
        &self,
        strategy: ResolutionStrategy,
        target: &Allocation,
        berth_id: &str,
        window: TimeWindow,
        impact: f64,
        cascading_effects: Vec<CascadingEffect>,
        description: String,
    ) -> Resolution {
        let cascade_hours: f64 = cascading_effects
            .iter()
            .map(|c| c.overlap_minutes as f64 / 60.0)
            .sum();
        let impact = impact + cascade_hours * self.config.delay_impact_per_hour;
        Resolution {
            strategy,
            target_vessel_id: target.vessel_id.clone(),
            change: ProposedChange {
                allocation_id: target.id.clone(),
                berth_id: berth_id.to_string(),
                window,
            },
            impact_score: impact.clamp(0.0, MAX_IMPACT),
            cascading_effects,
            description,
        }
    }

    fn find(&self, id: &str) -> Option<&'_ Allocation> {
        self.active.iter().find(|a| a.id == id)
    }

    fn resolve(&self, a: &Allocation) -> Option<(&Vessel, &Berth)> {
        Some((self.snapshot.vessel(&a.vessel_id)?, self.snapshot.berth(&a.berth_id)?))
    }

    /// Lower key = higher rank.
    fn rank_key<'b>(&self, a: &'b Allocation) -> (u8, i64, &'b str) {
        (
            self.snapshot.priority_ordinal(&a.vessel_id),
            a.window.start_ms,
            a.id.as_str(),
        )
    }

    /// Hard constraints that don't depend on other allocations.
    fn hard_violations(&self, vessel: &Vessel, berth: &Berth, window: &TimeWindow) -> Vec<Violation> {
        self.scoring
            .validator()
            .validate(vessel, berth, window, &[])
            .into_iter()
            .filter(|v| v.is_hard())
            .collect()
    }

    /// Active allocations at `berth_id` that `window` would overlap,
    /// other than `target` itself.
    fn cascading(&self, target: &Allocation, berth_id: &str, window: &TimeWindow) -> Vec<CascadingEffect> {
        self.active
            .iter()
            .filter(|a| a.id != target.id && a.berth_id == berth_id && a.window.overlaps(window))
            .map(|a| CascadingEffect {
                vessel_id: a.vessel_id.clone(),
                berth_id: a.berth_id.clone(),
                overlap_minutes: a.window.overlap_minutes(window),
            })
            .collect()
    }
}

/// `YYYY-MM-DD HH:MM` in UTC.
pub(super) fn fmt_instant(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}
