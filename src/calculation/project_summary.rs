//! Project commitment summary.
//!
//! Compares the effort a project needs with the effort already committed to
//! it by allocations, in full-time days.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{Allocation, DateWindow, Project};

/// How much of a project's effort has been allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCommitment {
    /// The project summarised.
    pub project_id: String,
    /// Project duration scaled by its FTE.
    pub project_days: Decimal,
    /// Effort committed by live allocations on the project.
    pub committed_days: Decimal,
    /// Project days not yet committed (negative when over-allocated).
    pub remaining_days: Decimal,
    /// Remaining days expressed at the project's own FTE; zero when FTE is zero.
    pub remaining_days_at_fte: Decimal,
    /// Committed days as a percentage of project days, to 2 places; 100 when
    /// the project has no days.
    pub percent_allocated: Decimal,
}

/// Summarises the commitment of a project from its allocations.
///
/// Allocations on other projects and deleted allocations are ignored.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::summarize_project;
/// use allocation_engine::config::EngineConfig;
/// use allocation_engine::models::{Allocation, Project, ProjectKind, ProjectStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let project = Project {
///     id: "p1".to_string(),
///     name: "Genomics pipeline".to_string(),
///     client: "Biology".to_string(),
///     internal: false,
///     start: d(1, 1),
///     end: d(1, 21),
///     status: ProjectStatus::Funded,
///     kind: ProjectKind::DirectlyIncurred {
///         percentage: Decimal::from(50),
///         overheads: Decimal::ZERO,
///         costed_salary: None,
///     },
/// };
/// let allocations = vec![Allocation {
///     id: "a1".to_string(),
///     staff_id: "rse_001".to_string(),
///     project_id: "p1".to_string(),
///     percentage: Decimal::from(50),
///     start: d(1, 1),
///     end: d(1, 11),
///     deleted: false,
/// }];
///
/// let summary = summarize_project(&project, &allocations, &EngineConfig::default());
/// assert_eq!(summary.project_days, Decimal::from(10));
/// assert_eq!(summary.committed_days, Decimal::from(5));
/// assert_eq!(summary.percent_allocated, Decimal::from(50));
/// ```
pub fn summarize_project(
    project: &Project,
    allocations: &[Allocation],
    config: &EngineConfig,
) -> ProjectCommitment {
    let fte = project.fte();
    let project_days = project_days(project, config);
    let committed_days: Decimal = allocations
        .iter()
        .filter(|a| !a.deleted && a.project_id == project.id)
        .map(Allocation::effort)
        .sum();
    let remaining_days = project_days - committed_days;

    let remaining_days_at_fte = if fte.is_zero() {
        Decimal::ZERO
    } else {
        remaining_days / fte * Decimal::ONE_HUNDRED
    };

    let percent_allocated = if project_days.is_zero() {
        Decimal::ONE_HUNDRED
    } else {
        (committed_days / project_days * Decimal::ONE_HUNDRED).round_dp(2)
    };

    ProjectCommitment {
        project_id: project.id.clone(),
        project_days,
        committed_days,
        remaining_days,
        remaining_days_at_fte,
        percent_allocated,
    }
}

/// Project duration scaled by its FTE.
pub fn project_days(project: &Project, config: &EngineConfig) -> Decimal {
    Decimal::from(project.duration(config)) * project.fte() / Decimal::ONE_HUNDRED
}

/// Share of the project's days covered by one allocation, as a percentage.
///
/// 100 when the project has no days.
pub fn allocation_share(allocation: &Allocation, project: &Project, config: &EngineConfig) -> Decimal {
    let days = project_days(project, config);
    if days.is_zero() {
        return Decimal::ONE_HUNDRED;
    }
    allocation.effort() / days * Decimal::ONE_HUNDRED
}

/// Working days scheduled on a project from its start up to `today`.
///
/// Counts every live allocation on the project, or only those of
/// `staff_id` when given.
pub fn scheduled_working_days_to(
    project: &Project,
    allocations: &[Allocation],
    today: NaiveDate,
    staff_id: Option<&str>,
    config: &EngineConfig,
) -> Decimal {
    let window = DateWindow {
        from: Some(project.start),
        until: Some(today.max(project.start)),
    };

    allocations
        .iter()
        .filter(|a| !a.deleted && a.project_id == project.id && a.start <= today)
        .filter(|a| staff_id.is_none_or(|id| id == a.staff_id))
        .map(|a| a.working_days(&window, config))
        .sum()
}
