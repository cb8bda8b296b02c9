//! Property tests for the commitment sweep and cost accounting.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;

use allocation_engine::calculation::{CostInputs, capacity_at, compute_cost, compute_timeline};
use allocation_engine::config::EngineConfig;
use allocation_engine::models::{
    Allocation, DateWindow, Project, ProjectKind, ProjectStatus, SalaryBand, SalaryBook,
};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    base() + Duration::days(offset)
}

fn allocation_strategy() -> impl Strategy<Value = (i64, i64, i64)> {
    (0_i64..120, 0_i64..60, 0_i64..=1000)
}

fn build(specs: &[(i64, i64, i64)]) -> Vec<Allocation> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(start, len, tenths))| Allocation {
            id: format!("a{i}"),
            staff_id: "rse_001".to_string(),
            project_id: "p1".to_string(),
            percentage: Decimal::new(tenths, 1),
            start: day(start),
            end: day(start + len),
            deleted: false,
        })
        .collect()
}

fn salaries() -> SalaryBook {
    SalaryBook::from_bands(vec![SalaryBand {
        staff_id: "rse_001".to_string(),
        grade: 7,
        grade_point: 1,
        annual_salary: Decimal::new(4_123_457, 2),
        effective_from: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
        increments_annually: false,
    }])
}

fn projects() -> HashMap<String, Project> {
    let project = Project {
        id: "p1".to_string(),
        name: "Project".to_string(),
        client: String::new(),
        internal: false,
        start: base(),
        end: day(365),
        status: ProjectStatus::Funded,
        kind: ProjectKind::DirectlyIncurred {
            percentage: Decimal::ONE_HUNDRED,
            overheads: Decimal::ZERO,
            costed_salary: None,
        },
    };
    HashMap::from([(project.id.clone(), project)])
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn timeline_is_deterministic(specs in prop::collection::vec(allocation_strategy(), 0..20)) {
        let allocations = build(&specs);
        let first = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();
        let second = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn event_effort_matches_active_sum(specs in prop::collection::vec(allocation_strategy(), 0..20)) {
        let allocations = build(&specs);
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        for pair in timeline.events().windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        for event in &timeline {
            let active: Decimal = event.active_allocations.iter().map(|a| a.percentage).sum();
            prop_assert_eq!(event.cumulative_effort, active);
            prop_assert_eq!(event.cumulative_effort, capacity_at(&allocations, event.date, |_| true));
        }
        if let Some(last) = timeline.events().last() {
            prop_assert_eq!(last.cumulative_effort, Decimal::ZERO);
        }
    }

    #[test]
    fn input_order_does_not_change_effort(specs in prop::collection::vec(allocation_strategy(), 0..20)) {
        let allocations = build(&specs);
        let mut reversed = allocations.clone();
        reversed.reverse();

        let forward = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();
        let backward = compute_timeline(&reversed, &DateWindow::UNBOUNDED).unwrap();
        prop_assert_eq!(forward.effort_series(), backward.effort_series());
    }

    #[test]
    fn zero_length_allocations_never_active(specs in prop::collection::vec(allocation_strategy(), 0..20)) {
        let allocations = build(&specs);
        let timeline = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        for event in &timeline {
            for active in &event.active_allocations {
                prop_assert!(active.start < active.end);
            }
        }
    }

    #[test]
    fn windowed_timeline_agrees_with_unbounded(
        specs in prop::collection::vec(allocation_strategy(), 0..20),
        from in 0_i64..150,
        len in 0_i64..90,
    ) {
        let allocations = build(&specs);
        let (start, end) = (day(from), day(from + len));
        let window = DateWindow::between(start, end).unwrap();
        let windowed = compute_timeline(&allocations, &window).unwrap();
        let unbounded = compute_timeline(&allocations, &DateWindow::UNBOUNDED).unwrap();

        for event in &windowed {
            prop_assert!(event.date >= start && event.date <= end);
            if event.date < end {
                prop_assert_eq!(
                    event.cumulative_effort,
                    capacity_at(&allocations, event.date, |_| true)
                );
            }
        }

        // Every change strictly inside the window survives clipping unchanged.
        for event in unbounded.iter().filter(|e| e.date > start && e.date < end) {
            let clipped = windowed.iter().find(|e| e.date == event.date);
            prop_assert!(clipped.is_some(), "missing event on {}", event.date);
            if let Some(clipped) = clipped {
                prop_assert_eq!(clipped.cumulative_effort, event.cumulative_effort);
                prop_assert_eq!(clipped.active_ids(), event.active_ids());
            }
        }
        for event in windowed.iter().filter(|e| e.date > start && e.date < end) {
            prop_assert!(unbounded.iter().any(|e| e.date == event.date));
        }
    }

    #[test]
    fn cost_total_is_conserved(
        specs in prop::collection::vec(allocation_strategy(), 0..20),
        from in 0_i64..150,
        len in 0_i64..90,
    ) {
        let allocations = build(&specs);
        let salaries = salaries();
        let projects = projects();
        let window = DateWindow::between(day(from), day(from + len)).unwrap();

        let result = compute_cost(
            &allocations,
            &window,
            &CostInputs::new(&salaries, &projects),
            &EngineConfig::default(),
            false,
        )
        .unwrap();

        let sum: Decimal = result.per_allocation.values().map(|c| c.amount).sum();
        prop_assert_eq!(result.total, sum);
        prop_assert_eq!(result.per_allocation.len(), allocations.len());
        for cost in result.per_allocation.values() {
            prop_assert!(cost.amount >= Decimal::ZERO);
            prop_assert!(cost.amount.scale() <= 2);
        }
    }
}
