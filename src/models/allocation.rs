//! Allocation model and the explicit allocation filter.
//!
//! An [`Allocation`] assigns a staff member to a project at some percentage
//! of full-time effort over a half-open date range. Allocations are never
//! hard-deleted; they carry a `deleted` flag instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

use super::DateWindow;
use super::interval::{self, clip};

/// A time-bounded assignment of a staff member to a project.
///
/// # Examples
///
/// ```
/// use allocation_engine::models::Allocation;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let allocation = Allocation {
///     id: "a1".to_string(),
///     staff_id: "rse_001".to_string(),
///     project_id: "p1".to_string(),
///     percentage: Decimal::from(50),
///     start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
///     deleted: false,
/// };
///
/// assert_eq!(allocation.duration_days(), 10);
/// assert_eq!(allocation.effort(), Decimal::from(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    /// Unique identifier for the allocation.
    pub id: String,
    /// The staff member being allocated.
    pub staff_id: String,
    /// The project the staff member is allocated to.
    pub project_id: String,
    /// Percentage of full-time effort. Values above 100 are tolerated.
    pub percentage: Decimal,
    /// First day of the allocation (inclusive).
    pub start: NaiveDate,
    /// Day the allocation stops (exclusive).
    pub end: NaiveDate,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
}

impl Allocation {
    /// Checks the allocation is well formed.
    ///
    /// Malformed allocations are always rejected, never normalized, so
    /// reported totals never silently change.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start > self.end {
            return Err(EngineError::InvalidInterval {
                subject: format!("allocation '{}'", self.id),
                start: self.start,
                end: self.end,
            });
        }
        if self.percentage < Decimal::ZERO {
            return Err(EngineError::InvalidAllocation {
                allocation_id: self.id.clone(),
                message: format!("percentage cannot be negative, got {}", self.percentage),
            });
        }
        Ok(())
    }

    /// Calendar days covered by the allocation.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Effort in full-time days: duration scaled by percentage.
    pub fn effort(&self) -> Decimal {
        Decimal::from(self.duration_days()) * self.percentage / Decimal::ONE_HUNDRED
    }

    /// Working days contributed inside `window`, scaled by percentage.
    pub fn working_days(&self, window: &DateWindow, config: &EngineConfig) -> Decimal {
        let span = clip(self, window);
        interval::working_days(span.days(), config.working_days_per_year) * self.percentage
            / Decimal::ONE_HUNDRED
    }

    /// Returns true if the allocation contributes effort on `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        !self.deleted && self.start <= date && date < self.end
    }

    /// Percentage of the allocation elapsed as of `today`.
    ///
    /// Zero before the allocation starts, 100 once it has ended, and 100 for
    /// a zero-length allocation that has started.
    pub fn current_progress(&self, today: NaiveDate) -> Decimal {
        if self.start > today {
            return Decimal::ZERO;
        }
        if self.end < today {
            return Decimal::ONE_HUNDRED;
        }
        let total = self.duration_days();
        if total == 0 {
            return Decimal::ONE_HUNDRED;
        }
        let elapsed = (today - self.start).num_days();
        Decimal::from(elapsed) / Decimal::from(total) * Decimal::ONE_HUNDRED
    }
}

/// Selects which allocations a query operates on.
///
/// Deleted allocations are excluded unless `include_deleted` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationFilter {
    /// Only allocations of this staff member.
    pub staff_id: Option<String>,
    /// Only allocations on this project.
    pub project_id: Option<String>,
    /// Only allocations overlapping this window.
    pub window: DateWindow,
    /// Keep allocations flagged as deleted.
    pub include_deleted: bool,
}

impl AllocationFilter {
    /// Creates a filter that matches every live allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to one staff member.
    pub fn for_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    /// Restricts the filter to one project.
    pub fn for_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Restricts the filter to allocations overlapping `window`.
    pub fn within(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Keeps soft-deleted allocations.
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Returns true if the allocation passes every criterion.
    pub fn matches(&self, allocation: &Allocation) -> bool {
        (self.include_deleted || !allocation.deleted)
            && self
                .staff_id
                .as_deref()
                .is_none_or(|id| id == allocation.staff_id)
            && self
                .project_id
                .as_deref()
                .is_none_or(|id| id == allocation.project_id)
            && self.window.overlaps(allocation.start, allocation.end)
    }

    /// Returns the matching allocations, preserving input order.
    pub fn apply<'a>(&self, allocations: &'a [Allocation]) -> Vec<&'a Allocation> {
        allocations.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Earliest start and latest end across live allocations.
///
/// Returns `None` when there are no live allocations.
pub fn allocation_span(allocations: &[Allocation]) -> Option<(NaiveDate, NaiveDate)> {
    let mut live = allocations.iter().filter(|a| !a.deleted);
    let first = live.next()?;
    Some(live.fold((first.start, first.end), |(start, end), a| {
        (start.min(a.start), end.max(a.end))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn allocation(id: &str, staff: &str, project: &str, start: u32, end: u32) -> Allocation {
        Allocation {
            id: id.to_string(),
            staff_id: staff.to_string(),
            project_id: project.to_string(),
            percentage: dec("50"),
            start: d(start),
            end: d(end),
            deleted: false,
        }
    }

    #[test]
    fn test_validate_accepts_zero_length() {
        assert!(allocation("a1", "s1", "p1", 5, 5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_start_after_end() {
        let result = allocation("a1", "s1", "p1", 9, 5).validate();
        match result {
            Err(EngineError::InvalidInterval { subject, start, end }) => {
                assert_eq!(subject, "allocation 'a1'");
                assert_eq!(start, d(9));
                assert_eq!(end, d(5));
            }
            _ => panic!("Expected InvalidInterval error"),
        }
    }

    #[test]
    fn test_validate_rejects_negative_percentage() {
        let mut a = allocation("a1", "s1", "p1", 1, 5);
        a.percentage = dec("-10");
        assert!(matches!(
            a.validate(),
            Err(EngineError::InvalidAllocation { .. })
        ));
    }

    #[test]
    fn test_validate_tolerates_over_100_percent() {
        let mut a = allocation("a1", "s1", "p1", 1, 5);
        a.percentage = dec("150");
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_effort_scales_duration() {
        let a = allocation("a1", "s1", "p1", 1, 21);
        assert_eq!(a.effort(), dec("10"));
    }

    #[test]
    fn test_working_days_in_window() {
        let a = allocation("a1", "s1", "p1", 1, 21);
        let config = EngineConfig::with_working_days_per_year(dec("365"));
        let window = DateWindow::between(d(11), d(31)).unwrap();
        assert_eq!(a.working_days(&window, &config), dec("5"));
        assert_eq!(a.working_days(&DateWindow::UNBOUNDED, &config), dec("10"));
    }

    #[test]
    fn test_is_active_on_is_half_open() {
        let a = allocation("a1", "s1", "p1", 1, 5);
        assert!(a.is_active_on(d(1)));
        assert!(a.is_active_on(d(4)));
        assert!(!a.is_active_on(d(5)));
    }

    #[test]
    fn test_deleted_allocation_is_never_active() {
        let mut a = allocation("a1", "s1", "p1", 1, 5);
        a.deleted = true;
        assert!(!a.is_active_on(d(2)));
    }

    #[test]
    fn test_current_progress() {
        let a = allocation("a1", "s1", "p1", 1, 11);
        assert_eq!(a.current_progress(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()), Decimal::ZERO);
        assert_eq!(a.current_progress(d(6)), dec("50"));
        assert_eq!(a.current_progress(d(20)), Decimal::ONE_HUNDRED);
        assert_eq!(allocation("a2", "s1", "p1", 3, 3).current_progress(d(3)), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_filter_excludes_deleted_by_default() {
        let mut deleted = allocation("a2", "s1", "p1", 1, 5);
        deleted.deleted = true;
        let allocations = vec![allocation("a1", "s1", "p1", 1, 5), deleted];

        let ids: Vec<&str> = AllocationFilter::new()
            .apply(&allocations)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a1"]);

        assert_eq!(
            AllocationFilter::new()
                .including_deleted()
                .apply(&allocations)
                .len(),
            2
        );
    }

    #[test]
    fn test_filter_by_staff_project_and_window() {
        let allocations = vec![
            allocation("a1", "s1", "p1", 1, 5),
            allocation("a2", "s2", "p1", 1, 5),
            allocation("a3", "s1", "p2", 1, 5),
            allocation("a4", "s1", "p1", 20, 25),
        ];

        let filter = AllocationFilter::new()
            .for_staff("s1")
            .for_project("p1")
            .within(DateWindow::between(d(1), d(10)).unwrap());
        let ids: Vec<&str> = filter.apply(&allocations).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1"]);
    }

    #[test]
    fn test_allocation_span() {
        let mut deleted = allocation("a3", "s1", "p1", 1, 30);
        deleted.deleted = true;
        let allocations = vec![
            allocation("a1", "s1", "p1", 4, 9),
            allocation("a2", "s1", "p1", 2, 7),
            deleted,
        ];
        assert_eq!(allocation_span(&allocations), Some((d(2), d(9))));
        assert_eq!(allocation_span(&[]), None);
    }
}
