//! End-to-end planning scenarios.

use chrono::{TimeZone, Utc};

use u_berth::config::{GaConfig, GreedyConfig, PortConfig};
use u_berth::constraints::ConstraintValidator;
use u_berth::models::{
    Allocation, AllocationSet, Berth, CargoType, ConflictType, ConstraintName, HOUR_MS, Priority,
    ProposedChange, Resolution, ResolutionStrategy, TimeWindow, Vessel,
};
use u_berth::planner::{BerthPlanner, PlanningSnapshot};
use u_berth::scheduler::{GreedyScheduler, NO_FEASIBLE_BERTH};
use u_berth::scoring::{ScoringContext, ScoringEngine};
use u_berth::PlanningError;

/// 2026-03-02 00:00 UTC (a Monday).
fn day() -> i64 {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .single()
        .map(|d| d.timestamp_millis())
        .unwrap()
}

fn at(hour: i64) -> i64 {
    day() + hour * HOUR_MS
}

fn v1() -> Vessel {
    Vessel::new("V1", at(10))
        .with_dimensions(300.0, 45.0, 14.0)
        .with_etd(at(18))
        .with_priority(Priority::Emergency)
}

fn v2() -> Vessel {
    Vessel::new("V2", at(14))
        .with_dimensions(180.0, 30.0, 10.0)
        .with_etd(at(20))
        .with_priority(Priority::Charter)
}

fn b1() -> Berth {
    Berth::new("B1", 320.0, 18.0)
}

#[test]
fn test_emergency_allocated_first() {
    // V2 listed first; priority decides the order.
    let vessels = vec![v2(), v1()];
    let berths = vec![b1()];
    let result = GreedyScheduler::default().schedule(&vessels, &berths, &[], &ScoringContext::new());

    assert_eq!(result.allocated.len(), 1);
    let a = &result.allocated[0];
    assert_eq!(a.vessel_id, "V1");
    assert_eq!(a.berth_id, "B1");
    assert_eq!(a.window, TimeWindow::new(at(10), at(18)));

    assert_eq!(result.unallocated.len(), 1);
    let u = &result.unallocated[0];
    assert_eq!(u.vessel_id, "V2");
    assert_eq!(u.reason, NO_FEASIBLE_BERTH);
    assert!(u
        .violations
        .iter()
        .any(|v| v.constraint == ConstraintName::BerthOccupied));
}

#[test]
fn test_clash_flagged_and_delay_proposed() {
    let planner = BerthPlanner::default();
    let snap = PlanningSnapshot::new(vec![v1(), v2()], vec![b1()]);
    let result = planner.allocate(&snap).unwrap();
    let mut set = planner.apply(&snap.allocations, &result);

    // V2 is booked onto B1 separately, against the plan.
    set.add(Allocation::new("V2", "B1", TimeWindow::new(at(14), at(20))));
    let snap = snap.with_allocations(set);

    let report = planner.detect_conflicts(&snap).unwrap();
    assert_eq!(report.conflicts.len(), 1);
    let conflict = &report.conflicts[0];
    assert_eq!(conflict.conflict_type, ConflictType::TemporalOverlap);
    assert_eq!(conflict.overlap_minutes, Some(240));

    let top = conflict.best_resolution().unwrap();
    assert_eq!(top.strategy, ResolutionStrategy::TimeShift);
    assert_eq!(top.target_vessel_id, "V2");
    assert_eq!(top.change.berth_id, "B1");
    assert_eq!(top.change.window.start_ms, at(18));
    assert!(top.cascading_effects.is_empty());
    assert!(top.description.contains("2026-03-02 18:00"));

    let (next, after) = planner.commit_resolution(&snap, conflict, top).unwrap();
    assert!(after.is_clean());
    assert_eq!(next.active_for_vessel("V2").unwrap().window.start_ms, at(18));
    assert_eq!(next.active_count(), 2);
}

#[test]
fn test_window_shift_places_delayed_vessel() {
    let greedy = GreedyConfig {
        max_shift_steps: 6,
        ..GreedyConfig::default()
    };
    let scheduler = GreedyScheduler::new(&PortConfig::default().with_greedy(greedy));
    let result = scheduler.schedule(&[v1(), v2()], &[b1()], &[], &ScoringContext::new());

    assert!(result.unallocated.is_empty());
    let a = result.allocation_for("V2").unwrap();
    assert_eq!(a.window, TimeWindow::new(at(18), at(24)));
}

#[test]
fn test_draft_limit_includes_ukc() {
    let deep = Vessel::new("V3", at(6)).with_dimensions(200.0, 32.0, 20.0);
    let berth = Berth::new("B9", 300.0, 21.0);
    let config = PortConfig::default();

    let violations = ConstraintValidator::new(&config).validate(
        &deep,
        &berth,
        &deep.requested_window(),
        &[],
    );
    let draft: Vec<_> = violations
        .iter()
        .filter(|v| v.constraint == ConstraintName::DraftLimit)
        .collect();
    assert_eq!(draft.len(), 1);
    assert!(draft[0].is_hard());
    assert_eq!(draft[0].constraint.to_string(), "DRAFT_LIMIT");

    let candidate = ScoringEngine::new(&config).evaluate(
        &deep,
        &berth,
        &deep.requested_window(),
        &[],
        &ScoringContext::new(),
    );
    assert!(!candidate.is_feasible());
    assert!(candidate.total() >= 0.0 && candidate.total() <= 100.0);
}

#[test]
fn test_berth_closure_replan_with_ga() {
    let vessels = vec![
        v1(),
        v2(),
        Vessel::new("V3", at(12))
            .with_dimensions(220.0, 32.0, 11.0)
            .with_etd(at(22))
            .with_cargo(CargoType::Container)
            .with_priority(Priority::Liner),
    ];
    let berths = vec![
        b1(),
        Berth::new("B2", 250.0, 14.0),
        Berth::new("B3", 250.0, 14.0),
    ];
    let config = PortConfig::default().with_ga(
        GaConfig::default()
            .with_seed(7)
            .with_population_size(30)
            .with_max_generations(40),
    );
    let planner = BerthPlanner::new(config);
    let snap = PlanningSnapshot::new(vessels, berths);

    let first = planner.optimize(&snap).unwrap();
    let second = planner.optimize(&snap).unwrap();
    assert_eq!(first.allocation, second.allocation);
    assert!(!first.budget_exceeded());
    assert_eq!(first.allocation.allocated.len(), 3);
    assert_eq!(first.allocation.allocation_for("V1").unwrap().berth_id, "B1");

    let set = AllocationSet::from_allocations(first.allocation.allocated.clone());
    let report = planner
        .detect_conflicts(&snap.clone().with_allocations(set))
        .unwrap();
    assert!(report.of_type(ConflictType::TemporalOverlap).next().is_none());
}

#[test]
fn test_unresolvable_is_explained() {
    let planner = BerthPlanner::default();
    let berths = vec![b1().with_maintenance(at(18), at(30))];
    let set = AllocationSet::from_allocations(vec![
        Allocation::new("V1", "B1", TimeWindow::new(at(10), at(18))),
        Allocation::new("V2", "B1", TimeWindow::new(at(11), at(17))),
    ]);
    let snap = PlanningSnapshot::new(vec![v1(), v2()], berths).with_allocations(set);

    let report = planner.detect_conflicts(&snap).unwrap();
    let conflict = &report.conflicts[0];
    assert!(!conflict.is_resolvable());
    assert!(!conflict.diagnostics.is_empty());

    let err = planner
        .commit_resolution(&snap, conflict, &forged_delay())
        .unwrap_err();
    assert!(matches!(err, PlanningError::UnknownResolution { .. }));
}

fn forged_delay() -> Resolution {
    Resolution {
        strategy: ResolutionStrategy::TimeShift,
        target_vessel_id: "V2".into(),
        change: ProposedChange {
            allocation_id: "V2/r0".into(),
            berth_id: "B1".into(),
            window: TimeWindow::new(at(18), at(24)),
        },
        impact_score: 40.0,
        cascading_effects: Vec::new(),
        description: String::new(),
    }
}
