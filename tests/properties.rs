//! Property-based tests for the planning invariants.

use std::collections::HashSet;

use proptest::prelude::*;

use u_berth::config::PortConfig;
use u_berth::conflict::ConflictEngine;
use u_berth::constraints::ConstraintValidator;
use u_berth::models::{
    Allocation, AllocationSet, Berth, CargoType, ConflictType, ConstraintName, HOUR_MS, Priority,
    ResourceAvailability, TimeWindow, Vessel,
};
use u_berth::scheduler::GreedyScheduler;
use u_berth::scoring::{ScoringContext, ScoringEngine};

/// Strategy for vessel dimensions, timing, priority and cargo.
fn vessel_strategy() -> impl Strategy<Value = (f64, f64, f64, i64, i64, u8, u8)> {
    (
        50.0f64..400.0, // LOA
        10.0f64..60.0,  // beam
        4.0f64..22.0,   // draft
        0i64..72,       // ETA hour
        1i64..30,       // dwell hours
        1u8..=4,        // priority
        0u8..4,         // cargo
    )
}

fn build_vessel(i: usize, params: (f64, f64, f64, i64, i64, u8, u8)) -> Vessel {
    let (loa, beam, draft, eta_h, dwell_h, priority, cargo) = params;
    let cargo = match cargo {
        0 => CargoType::Container,
        1 => CargoType::Bulk,
        2 => CargoType::General,
        _ => CargoType::Lng,
    };
    Vessel::new(format!("V{i}"), eta_h * HOUR_MS)
        .with_dimensions(loa, beam, draft)
        .with_etd((eta_h + dwell_h) * HOUR_MS)
        .with_priority(Priority::from_ordinal(priority).unwrap_or(Priority::Charter))
        .with_cargo(cargo)
}

fn vessels_strategy(max: usize) -> impl Strategy<Value = Vec<Vessel>> {
    prop::collection::vec(vessel_strategy(), 1..max).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, s)| build_vessel(i, s))
            .collect()
    })
}

fn berths_strategy(max: usize) -> impl Strategy<Value = Vec<Berth>> {
    prop::collection::vec((100.0f64..400.0, 6.0f64..25.0), 1..max).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (loa, depth))| Berth::new(format!("B{i}"), loa, depth))
            .collect()
    })
}

/// Allocations over three berths within a two-day horizon.
fn allocations_strategy() -> impl Strategy<Value = Vec<Allocation>> {
    prop::collection::vec((0usize..3, 0i64..48, 1i64..12), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (berth, start_h, len_h))| {
                Allocation::new(
                    format!("V{i}"),
                    format!("B{berth}"),
                    TimeWindow::new(start_h * HOUR_MS, (start_h + len_h) * HOUR_MS),
                )
            })
            .collect()
    })
}

fn overlapping_pairs(allocations: &[Allocation]) -> usize {
    let mut count = 0;
    for (i, a) in allocations.iter().enumerate() {
        for b in &allocations[i + 1..] {
            if a.berth_id == b.berth_id && a.window.overlaps(&b.window) {
                count += 1;
            }
        }
    }
    count
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: a greedy pass never commits two overlapping windows at
    /// one berth, including against existing allocations.
    #[test]
    fn prop_greedy_never_overlaps(
        vessels in vessels_strategy(12),
        berths in berths_strategy(4),
    ) {
        let existing = vec![Allocation::new(
            "X0",
            "B0",
            TimeWindow::new(20 * HOUR_MS, 30 * HOUR_MS),
        )];
        let result = GreedyScheduler::default().schedule(
            &vessels,
            &berths,
            &existing,
            &ScoringContext::new(),
        );

        let mut all = existing.clone();
        all.extend(result.allocated.iter().cloned());
        prop_assert_eq!(overlapping_pairs(&all), 0);
        prop_assert_eq!(result.allocated.len() + result.unallocated.len(), vessels.len());
    }

    /// Property: draft + 2.0 > depth is always a hard violation and never
    /// placed.
    #[test]
    fn prop_draft_limit_excluded(
        vessels in vessels_strategy(8),
        berths in berths_strategy(4),
    ) {
        let validator = ConstraintValidator::new(&PortConfig::default());
        for v in &vessels {
            for b in &berths {
                let violations = validator.validate(v, b, &v.requested_window(), &[]);
                let draft_hard = violations
                    .iter()
                    .any(|x| x.constraint == ConstraintName::DraftLimit && x.is_hard());
                prop_assert_eq!(draft_hard, v.draft_m + 2.0 > b.water_depth_m);
            }
        }

        let result = GreedyScheduler::default().schedule(
            &vessels,
            &berths,
            &[],
            &ScoringContext::new(),
        );
        for a in &result.allocated {
            let v = vessels.iter().find(|v| v.id == a.vessel_id).unwrap();
            let b = berths.iter().find(|b| b.id == a.berth_id).unwrap();
            prop_assert!(v.draft_m + 2.0 <= b.water_depth_m);
            prop_assert!(v.loa_m <= b.max_loa_m);
        }
    }

    /// Property: totals stay within [0, 100] whatever the violations and
    /// context.
    #[test]
    fn prop_score_bounded(
        vessels in vessels_strategy(6),
        berths in berths_strategy(4),
        existing in allocations_strategy(),
        queue in 0u32..20,
        visits in 0u32..10,
        pilots in prop::option::of(0u32..4),
    ) {
        let mut resources = ResourceAvailability::new();
        if let Some(p) = pilots {
            resources = resources.with_pilots(p);
        }
        let ctx = ScoringContext::new()
            .with_queue("B0", queue)
            .with_visits("V0", "B1", visits)
            .with_resources(resources);
        let engine = ScoringEngine::new(&PortConfig::default());

        for v in &vessels {
            for candidate in engine.rank_berths(v, &berths, &v.requested_window(), &existing, &ctx) {
                let total = candidate.total();
                prop_assert!((0.0..=100.0).contains(&total), "total {} out of range", total);
                prop_assert_eq!(candidate.is_feasible(), candidate.breakdown.violations.iter().all(|x| !x.is_hard()));
            }
        }
    }

    /// Property: identical input gives identical allocations, whatever the
    /// order vessels are listed in.
    #[test]
    fn prop_greedy_deterministic(
        vessels in vessels_strategy(10),
        berths in berths_strategy(4),
    ) {
        let scheduler = GreedyScheduler::default();
        let ctx = ScoringContext::new();
        let first = scheduler.schedule(&vessels, &berths, &[], &ctx);
        let second = scheduler.schedule(&vessels, &berths, &[], &ctx);
        prop_assert_eq!(&first, &second);

        let mut reversed = vessels.clone();
        reversed.reverse();
        let third = scheduler.schedule(&reversed, &berths, &[], &ctx);
        prop_assert_eq!(&first.allocated, &third.allocated);
    }

    /// Property: each overlapping unordered pair yields exactly one
    /// conflict, independent of insertion order.
    #[test]
    fn prop_conflict_symmetry(allocations in allocations_strategy()) {
        let engine = ConflictEngine::default();
        let ctx = ScoringContext::new();
        let berths: Vec<Berth> = (0..3).map(|i| Berth::new(format!("B{i}"), 400.0, 25.0)).collect();

        let forward = AllocationSet::from_allocations(allocations.clone());
        let report = engine.detect(&forward, &[], &berths, &ctx);
        let overlaps: Vec<_> = report.of_type(ConflictType::TemporalOverlap).collect();
        prop_assert_eq!(overlaps.len(), overlapping_pairs(&allocations));

        let ids: HashSet<&str> = overlaps.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(ids.len(), overlaps.len());

        let mut reversed = allocations.clone();
        reversed.reverse();
        let backward = engine.detect(&AllocationSet::from_allocations(reversed), &[], &berths, &ctx);
        let back_ids: HashSet<&str> = backward
            .of_type(ConflictType::TemporalOverlap)
            .map(|c| c.id.as_str())
            .collect();
        prop_assert_eq!(ids, back_ids);
    }
}
