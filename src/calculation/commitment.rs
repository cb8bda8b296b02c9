//! Commitment sweep functionality.
//!
//! This module turns a set of allocations into the cumulative effort curve
//! of the people allocated: a sweep over allocation endpoints in date order,
//! grouping every endpoint that falls on the same date into one event.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{Allocation, CommitmentEvent, DateWindow, Timeline, clip};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    date: NaiveDate,
    edge: Edge,
    slot: usize,
}

/// Computes the commitment timeline of a set of allocations.
///
/// Deleted allocations are discarded. The rest are clipped to `window`;
/// an allocation whose clipped span is empty never becomes active. One
/// [`CommitmentEvent`] is emitted per distinct endpoint date, after every
/// start and stop on that date has been applied.
///
/// Sorting the endpoints is O(n log n) in the number of surviving
/// allocations. Each event also copies the active set, so the snapshots
/// cost O(n * k) for n events with up to k allocations active at once:
/// O(n²) when every allocation is nested inside the others.
///
/// # Errors
///
/// Returns `InvalidInterval` if `window` has `from > until`, and
/// `InvalidInterval` or `InvalidAllocation` if a live allocation is
/// malformed. Well-formed input never fails, including an empty set.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::compute_timeline;
/// use allocation_engine::models::{Allocation, DateWindow};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let allocation = |id: &str, pct, start, end| Allocation {
///     id: id.to_string(),
///     staff_id: "rse_001".to_string(),
///     project_id: "p1".to_string(),
///     percentage: Decimal::from(pct),
///     start: d(start),
///     end: d(end),
///     deleted: false,
/// };
///
/// let allocations = vec![allocation("a1", 50, 1, 10), allocation("a2", 30, 5, 15)];
/// let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();
///
/// let efforts: Vec<_> = timeline.iter().map(|e| e.cumulative_effort).collect();
/// assert_eq!(efforts, vec![Decimal::from(50), Decimal::from(80), Decimal::from(30), Decimal::ZERO]);
/// ```
pub fn compute_timeline<'a>(
    allocations: &'a [Allocation],
    window: &DateWindow,
) -> EngineResult<Timeline<'a>> {
    sweep(allocations.iter().collect(), window)
}

/// Computes one timeline per staff member, keyed by staff id.
///
/// Staff whose allocations are all deleted are left out.
pub fn commitment_by_staff<'a>(
    allocations: &'a [Allocation],
    window: &DateWindow,
) -> EngineResult<BTreeMap<&'a str, Timeline<'a>>> {
    let mut by_staff: BTreeMap<&'a str, Vec<&'a Allocation>> = BTreeMap::new();
    for allocation in allocations.iter().filter(|a| !a.deleted) {
        by_staff
            .entry(allocation.staff_id.as_str())
            .or_default()
            .push(allocation);
    }

    by_staff
        .into_iter()
        .map(|(staff_id, group)| Ok((staff_id, sweep(group, window)?)))
        .collect()
}

/// Sums the percentage of every live allocation active on `date` that
/// passes `include`.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::capacity_at;
/// use allocation_engine::models::Allocation;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let allocations = vec![Allocation {
///     id: "a1".to_string(),
///     staff_id: "rse_001".to_string(),
///     project_id: "funded".to_string(),
///     percentage: Decimal::from(60),
///     start: d(1),
///     end: d(10),
///     deleted: false,
/// }];
///
/// assert_eq!(capacity_at(&allocations, d(5), |a| a.project_id == "funded"), Decimal::from(60));
/// assert_eq!(capacity_at(&allocations, d(10), |_| true), Decimal::ZERO);
/// ```
pub fn capacity_at<F>(allocations: &[Allocation], date: NaiveDate, include: F) -> Decimal
where
    F: Fn(&Allocation) -> bool,
{
    allocations
        .iter()
        .filter(|a| a.is_active_on(date) && include(a))
        .map(|a| a.percentage)
        .sum()
}

fn sweep<'a>(allocations: Vec<&'a Allocation>, window: &DateWindow) -> EngineResult<Timeline<'a>> {
    window.validate()?;

    let mut endpoints = Vec::with_capacity(allocations.len() * 2);

    for (slot, allocation) in allocations.iter().enumerate() {
        if allocation.deleted {
            continue;
        }
        allocation.validate()?;

        let span = clip(allocation, window);
        if span.is_empty() {
            continue;
        }
        endpoints.push(Endpoint {
            date: span.start,
            edge: Edge::Start,
            slot,
        });
        endpoints.push(Endpoint {
            date: span.end,
            edge: Edge::End,
            slot,
        });
    }

    endpoints.sort_by_key(|e| e.date);

    // Slots keep snapshots in input order.
    let mut active: BTreeSet<usize> = BTreeSet::new();
    let mut effort = Decimal::ZERO;
    let mut events = Vec::new();

    for group in endpoints.chunk_by(|a, b| a.date == b.date) {
        for endpoint in group {
            let percentage = allocations[endpoint.slot].percentage;
            match endpoint.edge {
                Edge::Start => {
                    active.insert(endpoint.slot);
                    effort += percentage;
                }
                Edge::End => {
                    active.remove(&endpoint.slot);
                    effort -= percentage;
                }
            }
        }

        events.push(CommitmentEvent {
            date: group[0].date,
            cumulative_effort: effort,
            active_allocations: active.iter().map(|&slot| allocations[slot]).collect(),
        });
    }

    debug!(
        allocations = allocations.len(),
        endpoints = endpoints.len(),
        events = events.len(),
        "Computed commitment timeline"
    );

    Ok(Timeline::from_events(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn allocation(id: &str, staff: &str, pct: &str, start: u32, end: u32) -> Allocation {
        Allocation {
            id: id.to_string(),
            staff_id: staff.to_string(),
            project_id: "p1".to_string(),
            percentage: dec(pct),
            start: d(start),
            end: d(end),
            deleted: false,
        }
    }

    fn efforts(timeline: &Timeline<'_>) -> Vec<(NaiveDate, Decimal)> {
        timeline.effort_series()
    }

    // ==========================================================================
    // Two overlapping allocations
    // ==========================================================================
    #[test]
    fn test_overlapping_allocations_sum_effort() {
        let allocations = vec![
            allocation("a1", "x", "50", 1, 10),
            allocation("a2", "x", "30", 5, 15),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        assert_eq!(
            efforts(&timeline),
            vec![
                (d(1), dec("50")),
                (d(5), dec("80")),
                (d(10), dec("30")),
                (d(15), Decimal::ZERO),
            ]
        );
        assert_eq!(timeline.events()[1].active_ids(), vec!["a1", "a2"]);
        assert_eq!(timeline.events()[2].active_ids(), vec!["a2"]);
        assert!(timeline.events()[3].active_allocations.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_timeline() {
        let timeline = compute_timeline(&[], &DateWindow::UNBOUNDED).unwrap();
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_zero_length_allocation_never_appears() {
        let allocations = vec![
            allocation("a1", "x", "40", 3, 3),
            allocation("a2", "x", "20", 1, 5),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        assert_eq!(timeline.len(), 2);
        assert!(
            timeline
                .iter()
                .all(|e| !e.active_ids().contains(&"a1"))
        );
    }

    #[test]
    fn test_deleted_allocations_discarded() {
        let mut deleted = allocation("a2", "x", "30", 1, 5);
        deleted.deleted = true;
        let allocations = vec![allocation("a1", "x", "50", 1, 5), deleted];

        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();
        assert_eq!(
            efforts(&timeline),
            vec![(d(1), dec("50")), (d(5), Decimal::ZERO)]
        );
    }

    // ==========================================================================
    // Same-day start and stop are applied together
    // ==========================================================================
    #[test]
    fn test_handover_on_same_day_emits_single_event() {
        let allocations = vec![
            allocation("a1", "x", "50", 1, 10),
            allocation("a2", "x", "70", 10, 20),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        assert_eq!(
            efforts(&timeline),
            vec![(d(1), dec("50")), (d(10), dec("70")), (d(20), Decimal::ZERO)]
        );
        assert_eq!(timeline.events()[1].active_ids(), vec!["a2"]);
    }

    #[test]
    fn test_identical_allocations_grouped() {
        let allocations = vec![
            allocation("a1", "x", "25", 2, 6),
            allocation("a2", "x", "25", 2, 6),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        assert_eq!(
            efforts(&timeline),
            vec![(d(2), dec("50")), (d(6), Decimal::ZERO)]
        );
    }

    #[test]
    fn test_over_100_percent_tolerated() {
        let allocations = vec![
            allocation("a1", "x", "80", 1, 10),
            allocation("a2", "x", "60", 1, 10),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();
        assert_eq!(timeline.peak().unwrap().cumulative_effort, dec("140"));
    }

    // ==========================================================================
    // Window clipping
    // ==========================================================================
    #[test]
    fn test_window_clips_endpoints() {
        let allocations = vec![allocation("a1", "x", "50", 1, 20)];
        let window = DateWindow::between(d(5), d(10)).unwrap();
        let timeline = compute_timeline(&allocations, &window).unwrap();

        assert_eq!(
            efforts(&timeline),
            vec![(d(5), dec("50")), (d(10), Decimal::ZERO)]
        );
    }

    #[test]
    fn test_allocation_outside_window_dropped() {
        let allocations = vec![
            allocation("a1", "x", "50", 1, 5),
            allocation("a2", "x", "30", 25, 30),
        ];
        let window = DateWindow::between(d(10), d(20)).unwrap();
        let timeline = compute_timeline(&allocations, &window).unwrap();
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_malformed_allocation_rejected() {
        let allocations = vec![allocation("bad", "x", "50", 9, 2)];
        let result = compute_timeline(&allocations, &DateWindow::UNBOUNDED);
        assert!(matches!(result, Err(EngineError::InvalidInterval { .. })));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let allocations = vec![allocation("a1", "x", "50", 1, 30)];
        let window = DateWindow {
            from: Some(d(20)),
            until: Some(d(10)),
        };

        let result = compute_timeline(&allocations, &window);
        assert!(matches!(result, Err(EngineError::InvalidInterval { .. })));
        assert!(commitment_by_staff(&allocations, &window).is_err());
    }

    #[test]
    fn test_snapshots_are_independent() {
        let allocations = vec![
            allocation("a1", "x", "10", 1, 3),
            allocation("a2", "x", "10", 2, 4),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        let sizes: Vec<usize> = timeline
            .iter()
            .map(|e| e.active_allocations.len())
            .collect();
        assert_eq!(sizes, vec![1, 2, 1, 0]);
    }

    #[test]
    fn test_effort_at_reads_step_function() {
        let allocations = vec![
            allocation("a1", "x", "50", 5, 10),
            allocation("a2", "x", "30", 8, 12),
        ];
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        assert_eq!(timeline.effort_at(d(1)), Decimal::ZERO);
        assert_eq!(timeline.effort_at(d(5)), dec("50"));
        assert_eq!(timeline.effort_at(d(9)), dec("80"));
        assert_eq!(timeline.effort_at(d(11)), dec("30"));
        assert_eq!(timeline.effort_at(d(31)), Decimal::ZERO);
    }

    // ==========================================================================
    // Per-staff timelines and capacity
    // ==========================================================================
    #[test]
    fn test_commitment_by_staff_splits_timelines() {
        let allocations = vec![
            allocation("a1", "y", "50", 1, 10),
            allocation("a2", "x", "30", 5, 15),
            allocation("a3", "x", "20", 5, 15),
        ];
        let by_staff = commitment_by_staff(&allocations, &DateWindow::UNBOUNDED).unwrap();

        let staff: Vec<&str> = by_staff.keys().copied().collect();
        assert_eq!(staff, vec!["x", "y"]);
        assert_eq!(
            by_staff["x"].effort_series(),
            vec![(d(5), dec("50")), (d(15), Decimal::ZERO)]
        );
        assert_eq!(by_staff["y"].len(), 2);
    }

    #[test]
    fn test_capacity_at_filters_projects() {
        let mut unfunded = allocation("a2", "x", "30", 1, 10);
        unfunded.project_id = "p2".to_string();
        let allocations = vec![allocation("a1", "x", "50", 1, 10), unfunded];

        assert_eq!(capacity_at(&allocations, d(3), |_| true), dec("80"));
        assert_eq!(
            capacity_at(&allocations, d(3), |a| a.project_id == "p1"),
            dec("50")
        );
    }
}
