//! Conflict detection over an allocation set.

use std::collections::BTreeMap;

use super::{ShortageRule, Snapshot};
use crate::models::{
    Allocation, AllocationSet, Conflict, ConflictType, HOUR_MS, TimeWindow, hour_start,
};

/// Every pair of active allocations at the same berth whose windows
/// overlap yields one conflict.
///
/// Pairs are visited in (berth, start, ID) order, so the output does not
/// depend on the order allocations were added.
pub(super) fn temporal_overlaps(set: &AllocationSet, severity: u8) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (berth_id, list) in set.by_berth() {
        for (i, a) in list.iter().enumerate() {
            for b in &list[i + 1..] {
                // Sorted by start: nothing later can overlap `a` either.
                if b.window.start_ms >= a.window.end_ms {
                    break;
                }
                let Some(window) = a.window.intersection(&b.window) else {
                    continue;
                };
                conflicts.push(Conflict {
                    id: format!("{}:{}|{}", ConflictType::TemporalOverlap, a.id, b.id),
                    conflict_type: ConflictType::TemporalOverlap,
                    severity,
                    vessel_ids: vec![a.vessel_id.clone(), b.vessel_id.clone()],
                    berth_ids: vec![berth_id.to_string()],
                    allocation_ids: vec![a.id.clone(), b.id.clone()],
                    window,
                    overlap_minutes: Some(a.window.overlap_minutes(&b.window)),
                    resource: None,
                    resolutions: Vec::new(),
                    diagnostics: Vec::new(),
                });
            }
        }
    }

    conflicts
}

/// One allocation counted against a shortage rule.
pub(super) struct Arrival<'a> {
    pub allocation: &'a Allocation,
    /// Demand the arrival places on the resource.
    pub demand: u32,
}

/// Active allocations drawing on the rule's resource, keyed by the start
/// (ms) of their arrival hour.
pub(super) fn demand_buckets<'a>(
    set: &'a AllocationSet,
    snapshot: &Snapshot<'_>,
    rule: &ShortageRule,
) -> BTreeMap<i64, Vec<Arrival<'a>>> {
    let mut buckets: BTreeMap<i64, Vec<Arrival<'a>>> = BTreeMap::new();
    for a in set.active() {
        let demand = rule.demand(snapshot, &a.vessel_id);
        if demand > 0 {
            buckets
                .entry(hour_start(a.window.start_ms))
                .or_default()
                .push(Arrival { allocation: a, demand });
        }
    }
    for list in buckets.values_mut() {
        list.sort_by(|x, y| {
            x.allocation
                .window
                .start_ms
                .cmp(&y.allocation.window.start_ms)
                .then_with(|| x.allocation.id.cmp(&y.allocation.id))
        });
    }
    buckets
}

/// Total demand per arrival hour.
pub(super) fn bucket_load(buckets: &BTreeMap<i64, Vec<Arrival<'_>>>) -> BTreeMap<i64, u32> {
    buckets
        .iter()
        .map(|(&hour, list)| (hour, total_demand(list)))
        .collect()
}

/// Arrival hours whose demand exceeds the rule's capacity.
pub(super) fn shortages(
    buckets: &BTreeMap<i64, Vec<Arrival<'_>>>,
    rule: &ShortageRule,
    severity: u8,
) -> Vec<Conflict> {
    buckets
        .iter()
        .filter(|(_, list)| total_demand(list) > rule.capacity())
        .map(|(&hour, list)| {
            let mut berth_ids: Vec<String> = list
                .iter()
                .map(|x| x.allocation.berth_id.clone())
                .collect();
            berth_ids.sort();
            berth_ids.dedup();
            Conflict {
                id: format!("{}:{}:{hour}", ConflictType::ResourceShortage, rule.kind()),
                conflict_type: ConflictType::ResourceShortage,
                severity,
                vessel_ids: list.iter().map(|x| x.allocation.vessel_id.clone()).collect(),
                berth_ids,
                allocation_ids: list.iter().map(|x| x.allocation.id.clone()).collect(),
                window: TimeWindow::new(hour, hour.saturating_add(HOUR_MS)),
                overlap_minutes: None,
                resource: Some(rule.kind()),
                resolutions: Vec::new(),
                diagnostics: Vec::new(),
            }
        })
        .collect()
}

fn total_demand(list: &[Arrival<'_>]) -> u32 {
    list.iter().fold(0u32, |sum, x| sum.saturating_add(x.demand))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceKind, Vessel};

    fn alloc(vessel: &str, berth: &str, start_h: i64, end_h: i64) -> Allocation {
        Allocation::new(vessel, berth, TimeWindow::new(start_h * HOUR_MS, end_h * HOUR_MS))
    }

    #[test]
    fn test_overlap_pairs() {
        let set = AllocationSet::from_allocations(vec![
            alloc("V1", "B1", 10, 18),
            alloc("V2", "B1", 14, 20),
            alloc("V3", "B1", 18, 22),
            alloc("V4", "B2", 10, 18),
        ]);
        let conflicts = temporal_overlaps(&set, 10);
        // V1-V2 and V2-V3; V1-V3 are back to back.
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].vessel_ids, vec!["V1", "V2"]);
        assert_eq!(conflicts[0].overlap_minutes, Some(240));
        assert_eq!(
            conflicts[0].window,
            TimeWindow::new(14 * HOUR_MS, 18 * HOUR_MS)
        );
        assert_eq!(conflicts[1].vessel_ids, vec!["V2", "V3"]);
        assert_eq!(conflicts[1].overlap_minutes, Some(120));
        assert!(conflicts.iter().all(|c| c.severity == 10));
    }

    #[test]
    fn test_nested_windows() {
        let set = AllocationSet::from_allocations(vec![
            alloc("V1", "B1", 0, 24),
            alloc("V2", "B1", 2, 4),
            alloc("V3", "B1", 6, 8),
        ]);
        assert_eq!(temporal_overlaps(&set, 10).len(), 2);
    }

    #[test]
    fn test_superseded_ignored() {
        let mut set = AllocationSet::from_allocations(vec![
            alloc("V1", "B1", 10, 18),
            alloc("V2", "B1", 14, 20),
        ]);
        let moved = set.allocations[1].revised("B2", TimeWindow::new(14 * HOUR_MS, 20 * HOUR_MS));
        assert!(set.supersede("V2/r0", moved));
        assert!(temporal_overlaps(&set, 10).is_empty());
    }

    #[test]
    fn test_pilot_shortage() {
        let vessels: Vec<Vessel> = ["V1", "V2", "V3", "V4"]
            .iter()
            .map(|id| Vessel::new(*id, 0))
            .collect();
        let snapshot = Snapshot::new(&vessels, &[]);
        let set = AllocationSet::from_allocations(vec![
            Allocation::new("V1", "B1", TimeWindow::new(10 * HOUR_MS, 12 * HOUR_MS)),
            Allocation::new("V2", "B2", TimeWindow::new(10 * HOUR_MS + 900_000, 12 * HOUR_MS)),
            Allocation::new("V3", "B3", TimeWindow::new(10 * HOUR_MS + 1_800_000, 12 * HOUR_MS)),
            Allocation::new("V4", "B4", TimeWindow::new(11 * HOUR_MS, 12 * HOUR_MS)),
        ]);

        let rule = ShortageRule::per_arrival(ResourceKind::Pilot, 2);
        let buckets = demand_buckets(&set, &snapshot, &rule);
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![10 * HOUR_MS, 11 * HOUR_MS]);
        assert_eq!(bucket_load(&buckets)[&(10 * HOUR_MS)], 3);

        let conflicts = shortages(&buckets, &rule, 5);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.severity, 5);
        assert_eq!(c.vessel_ids, vec!["V1", "V2", "V3"]);
        assert_eq!(c.window, TimeWindow::new(10 * HOUR_MS, 11 * HOUR_MS));
        assert_eq!(c.id, format!("RESOURCE_SHORTAGE:PILOT:{}", 10 * HOUR_MS));
        assert_eq!(c.resource, Some(ResourceKind::Pilot));
        assert_eq!(c.overlap_minutes, None);

        // Exactly at the threshold is fine.
        let rule = ShortageRule::per_arrival(ResourceKind::Pilot, 3);
        assert!(shortages(&demand_buckets(&set, &snapshot, &rule), &rule, 5).is_empty());
    }

    #[test]
    fn test_pilot_free_vessels_not_counted() {
        let vessels = vec![
            Vessel::new("V1", 0).with_requirements(0, 0, 0),
            Vessel::new("V2", 0),
            Vessel::new("V3", 0),
        ];
        let snapshot = Snapshot::new(&vessels, &[]);
        let set = AllocationSet::from_allocations(vec![
            alloc("V1", "B1", 10, 12),
            alloc("V2", "B2", 10, 12),
            alloc("V3", "B3", 10, 12),
        ]);
        let rule = ShortageRule::per_arrival(ResourceKind::Pilot, 2);
        assert!(shortages(&demand_buckets(&set, &snapshot, &rule), &rule, 5).is_empty());
    }

    #[test]
    fn test_pooled_demand_sums_units() {
        let vessels = vec![
            Vessel::new("V1", 0).with_requirements(3, 2, 0),
            Vessel::new("V2", 0).with_requirements(1, 2, 0),
        ];
        let snapshot = Snapshot::new(&vessels, &[]);
        let set = AllocationSet::from_allocations(vec![
            alloc("V1", "B1", 10, 12),
            alloc("V2", "B2", 10, 12),
        ]);

        // Two arrivals, four pilots.
        let pooled = ShortageRule::per_unit(ResourceKind::Pilot, 3);
        let buckets = demand_buckets(&set, &snapshot, &pooled);
        assert_eq!(bucket_load(&buckets)[&(10 * HOUR_MS)], 4);
        assert_eq!(shortages(&buckets, &pooled, 5).len(), 1);

        let counted = ShortageRule::per_arrival(ResourceKind::Pilot, 3);
        assert!(shortages(&demand_buckets(&set, &snapshot, &counted), &counted, 5).is_empty());

        let tugs = ShortageRule::per_unit(ResourceKind::Tug, 4);
        assert!(shortages(&demand_buckets(&set, &snapshot, &tugs), &tugs, 5).is_empty());
        let tugs = ShortageRule::per_unit(ResourceKind::Tug, 3);
        let conflicts = shortages(&demand_buckets(&set, &snapshot, &tugs), &tugs, 5);
        assert_eq!(conflicts[0].resource, Some(ResourceKind::Tug));
        assert!(conflicts[0].id.starts_with("RESOURCE_SHORTAGE:TUG:"));
    }
}
