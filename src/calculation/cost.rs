//! Staff cost accumulation.
//!
//! This module costs allocations against their staff members' salaries:
//! each allocation is clipped to the query window, the salary in force at
//! the clipped start is resolved once, calendar days are converted to
//! working days, and the amount is scaled by the allocation percentage.
//!
//! The salary is resolved once per allocation at its clipped start date. An
//! allocation spanning a salary change is costed entirely at the rate in
//! force when its clipped span begins; it is not pro-rated.

use std::collections::{HashMap, HashSet};

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::config::{EngineConfig, PayScaleBook};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Allocation, AllocationCost, AllocationFilter, AuditStep, CostResult, DateWindow, Project,
    SalaryBook, clip, working_days,
};

use super::salary_lookup::resolve_rate;

/// Reference data a cost calculation reads from.
#[derive(Debug, Clone, Copy)]
pub struct CostInputs<'a> {
    /// Salary histories of every staff member that may be costed.
    pub salaries: &'a SalaryBook,
    /// Projects keyed by id, used to recognise internal projects.
    pub projects: &'a HashMap<String, Project>,
    /// Pay scales for projecting bands into later financial years.
    pub scales: Option<&'a PayScaleBook>,
}

impl<'a> CostInputs<'a> {
    /// Creates inputs without pay scales.
    pub fn new(salaries: &'a SalaryBook, projects: &'a HashMap<String, Project>) -> Self {
        Self {
            salaries,
            projects,
            scales: None,
        }
    }

    /// Adds pay scales for projecting salaries across financial years.
    pub fn with_scales(mut self, scales: &'a PayScaleBook) -> Self {
        self.scales = Some(scales);
        self
    }
}

/// Computes the staff cost of a set of allocations over a window.
///
/// Deleted allocations are skipped. With `exclude_internal` set,
/// allocations on internal projects are skipped too, so a set made only of
/// internal allocations yields a zero total with an empty breakdown.
/// Allocations whose clipped span is empty are recorded with a zero amount.
///
/// Each per-allocation amount is rounded to cents and `total` is their exact
/// sum.
///
/// # Errors
///
/// - `NoSalaryData` if an allocation with a non-empty clipped span has no
///   salary in force at its clipped start.
/// - `ProjectNotFound` if `exclude_internal` is set and an allocation's
///   project was not supplied.
/// - `InvalidInterval` / `InvalidAllocation` for malformed allocations or
///   duplicate allocation ids.
/// - `CalculationError` if the configuration is unusable.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use allocation_engine::calculation::{compute_cost, CostInputs};
/// use allocation_engine::config::EngineConfig;
/// use allocation_engine::models::{Allocation, DateWindow, SalaryBand, SalaryBook};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 9, day).unwrap();
/// let salaries = SalaryBook::from_bands(vec![SalaryBand {
///     staff_id: "rse_001".to_string(),
///     grade: 7,
///     grade_point: 1,
///     annual_salary: Decimal::from(36500),
///     effective_from: d(1),
///     increments_annually: false,
/// }]);
/// let projects = HashMap::new();
/// let allocations = vec![Allocation {
///     id: "a1".to_string(),
///     staff_id: "rse_001".to_string(),
///     project_id: "p1".to_string(),
///     percentage: Decimal::from(100),
///     start: d(1),
///     end: d(30),
///     deleted: false,
/// }];
///
/// let config = EngineConfig::with_working_days_per_year(Decimal::from(365));
/// let window = DateWindow::between(d(5), d(15)).unwrap();
/// let result = compute_cost(&allocations, &window, &CostInputs::new(&salaries, &projects), &config, false).unwrap();
///
/// assert_eq!(result.total, Decimal::from(1000));
/// ```
pub fn compute_cost(
    allocations: &[Allocation],
    window: &DateWindow,
    inputs: &CostInputs<'_>,
    config: &EngineConfig,
    exclude_internal: bool,
) -> EngineResult<CostResult> {
    accumulate(allocations.iter(), window, inputs, config, exclude_internal)
}

/// Computes the staff cost of one project.
///
/// Internal projects cost nothing unless `consider_internal` is set. When
/// the configuration's `strict_allocation_window` is on, the window is
/// narrowed to the project's own span. Only allocations on the project that
/// overlap the window are costed, optionally only those of one staff member.
pub fn project_staff_cost(
    project: &Project,
    allocations: &[Allocation],
    window: &DateWindow,
    staff_id: Option<&str>,
    inputs: &CostInputs<'_>,
    config: &EngineConfig,
    consider_internal: bool,
) -> EngineResult<CostResult> {
    if project.internal && !consider_internal {
        debug!(project_id = %project.id, "Skipping internal project");
        return Ok(CostResult::default());
    }

    window.validate()?;

    let window = if config.strict_allocation_window {
        window.restrict_to(project.start, project.end)
    } else {
        *window
    };

    let mut filter = AllocationFilter::new()
        .for_project(project.id.as_str())
        .within(window);
    if let Some(staff_id) = staff_id {
        filter = filter.for_staff(staff_id);
    }

    accumulate(
        filter.apply(allocations),
        &window,
        inputs,
        config,
        false,
    )
}

/// Computes the cost of every allocation held by one staff member.
pub fn staff_cost(
    staff_id: &str,
    allocations: &[Allocation],
    window: &DateWindow,
    inputs: &CostInputs<'_>,
    config: &EngineConfig,
    exclude_internal: bool,
) -> EngineResult<CostResult> {
    let filter = AllocationFilter::new().for_staff(staff_id);
    accumulate(
        filter.apply(allocations),
        window,
        inputs,
        config,
        exclude_internal,
    )
}

fn accumulate<'a>(
    allocations: impl IntoIterator<Item = &'a Allocation>,
    window: &DateWindow,
    inputs: &CostInputs<'_>,
    config: &EngineConfig,
    exclude_internal: bool,
) -> EngineResult<CostResult> {
    config.validate()?;
    window.validate()?;

    let mut result = CostResult::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut step_number: u32 = 1;

    for allocation in allocations {
        if allocation.deleted {
            continue;
        }
        allocation.validate()?;

        if exclude_internal && is_internal(allocation, inputs)? {
            debug!(
                allocation_id = %allocation.id,
                project_id = %allocation.project_id,
                "Excluding allocation on internal project"
            );
            continue;
        }

        if !seen.insert(allocation.id.as_str()) {
            return Err(EngineError::InvalidAllocation {
                allocation_id: allocation.id.clone(),
                message: "allocation id appears more than once".to_string(),
            });
        }

        let (cost, step) = cost_allocation(allocation, window, inputs, config, step_number)?;
        result.record(cost, step);
        step_number += 1;
    }

    debug!(
        costed = result.per_allocation.len(),
        total = %result.total,
        "Computed staff cost"
    );

    Ok(result)
}

fn is_internal(allocation: &Allocation, inputs: &CostInputs<'_>) -> EngineResult<bool> {
    inputs
        .projects
        .get(&allocation.project_id)
        .map(|p| p.internal)
        .ok_or_else(|| EngineError::ProjectNotFound {
            project_id: allocation.project_id.clone(),
        })
}

fn cost_allocation(
    allocation: &Allocation,
    window: &DateWindow,
    inputs: &CostInputs<'_>,
    config: &EngineConfig,
    step_number: u32,
) -> EngineResult<(AllocationCost, AuditStep)> {
    let span = clip(allocation, window);

    let input = serde_json::json!({
        "allocation_id": allocation.id,
        "staff_id": allocation.staff_id,
        "percentage": allocation.percentage.normalize().to_string(),
        "clipped_start": span.start.to_string(),
        "clipped_end": span.end.to_string()
    });

    if span.is_empty() {
        let cost = AllocationCost {
            allocation_id: allocation.id.clone(),
            staff_id: allocation.staff_id.clone(),
            project_id: allocation.project_id.clone(),
            span,
            calendar_days: 0,
            working_days: Decimal::ZERO,
            percentage: allocation.percentage,
            rate: None,
            daily_rate: Decimal::ZERO,
            amount: Decimal::ZERO,
        };
        let step = AuditStep {
            step_number,
            rule_id: "allocation_staff_cost".to_string(),
            rule_name: "Allocation Staff Cost".to_string(),
            input,
            output: serde_json::json!({ "amount": "0.00" }),
            reasoning: format!(
                "Allocation '{}' has no days inside the query window, no cost in period",
                allocation.id
            ),
        };
        return Ok((cost, step));
    }

    let history = inputs.salaries.get(&allocation.staff_id).ok_or_else(|| {
        EngineError::NoSalaryData {
            staff_id: allocation.staff_id.clone(),
            date: span.start,
            reason: "no salary history supplied".to_string(),
        }
    })?;
    let rate = resolve_rate(history, span.start, config, inputs.scales)?;

    let calendar_days = span.days();
    let working = working_days(calendar_days, config.working_days_per_year);
    let daily_rate = rate.annual_salary / config.working_days_per_year;

    // Multiply before dividing so whole-number inputs stay exact.
    let mut amount = (working * rate.annual_salary * allocation.percentage
        / (config.working_days_per_year * Decimal::ONE_HUNDRED))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);

    let step = AuditStep {
        step_number,
        rule_id: "allocation_staff_cost".to_string(),
        rule_name: "Allocation Staff Cost".to_string(),
        input,
        output: serde_json::json!({
            "calendar_days": calendar_days,
            "working_days": working.round_dp(4).normalize().to_string(),
            "grade": rate.grade,
            "grade_point": rate.grade_point,
            "annual_salary": rate.annual_salary.normalize().to_string(),
            "daily_rate": daily_rate.round_dp(4).normalize().to_string(),
            "amount": amount.to_string()
        }),
        reasoning: format!(
            "{} calendar days = {} working days × ${} per day × {}% = ${}",
            calendar_days,
            working.round_dp(2).normalize(),
            daily_rate.round_dp(2).normalize(),
            allocation.percentage.normalize(),
            amount
        ),
    };

    let cost = AllocationCost {
        allocation_id: allocation.id.clone(),
        staff_id: allocation.staff_id.clone(),
        project_id: allocation.project_id.clone(),
        span,
        calendar_days,
        working_days: working,
        percentage: allocation.percentage,
        rate: Some(rate),
        daily_rate,
        amount,
    };

    Ok((cost, step))
}
