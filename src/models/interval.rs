//! Half-open date intervals and the day conversions shared by the engine.
//!
//! Every span in the engine is half-open: it covers each day `d` with
//! `start <= d < end`. A span whose start equals its end covers nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Allocation;

/// Calendar days in a (non-leap) year, the denominator for working-day conversion.
pub const CALENDAR_DAYS_PER_YEAR: Decimal = Decimal::from_parts(365, 0, 0, false, 0);

/// An optional clipping window `[from, until)`.
///
/// A missing bound leaves that side of an interval unclipped.
///
/// # Example
///
/// ```
/// use allocation_engine::models::DateWindow;
/// use chrono::NaiveDate;
///
/// let window = DateWindow::new(
///     Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
///     Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
/// )
/// .unwrap();
///
/// assert!(window.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
/// assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// Inclusive lower bound, if any.
    pub from: Option<NaiveDate>,
    /// Exclusive upper bound, if any.
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    /// A window with no bounds on either side.
    pub const UNBOUNDED: DateWindow = DateWindow {
        from: None,
        until: None,
    };

    /// Creates a window, rejecting `from > until`.
    pub fn new(from: Option<NaiveDate>, until: Option<NaiveDate>) -> EngineResult<Self> {
        let window = Self { from, until };
        window.validate()?;
        Ok(window)
    }

    /// Checks `from <= until` when both bounds are set.
    ///
    /// Windows built from struct literals or deserialized input skip
    /// [`DateWindow::new`], so every calculation taking a window calls this.
    pub fn validate(&self) -> EngineResult<()> {
        if let (Some(from), Some(until)) = (self.from, self.until) {
            if from > until {
                return Err(EngineError::InvalidInterval {
                    subject: "query window".to_string(),
                    start: from,
                    end: until,
                });
            }
        }
        Ok(())
    }

    /// Creates a window bounded on both sides.
    pub fn between(from: NaiveDate, until: NaiveDate) -> EngineResult<Self> {
        Self::new(Some(from), Some(until))
    }

    /// Returns true if `date` lies inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.until.is_none_or(|u| date < u)
    }

    /// Returns true if the half-open span `[start, end)` shares at least one day with the window.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.from.is_none_or(|f| end > f) && self.until.is_none_or(|u| start < u)
    }

    /// Narrows this window so it lies within `[start, end)`.
    pub fn restrict_to(&self, start: NaiveDate, end: NaiveDate) -> DateWindow {
        let from = self.from.map_or(start, |f| f.max(start));
        let until = self.until.map_or(end, |u| u.min(end));
        DateWindow {
            from: Some(from),
            until: Some(until.max(from)),
        }
    }
}

/// The part of an interval that survives clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First covered day.
    pub start: NaiveDate,
    /// First day no longer covered.
    pub end: NaiveDate,
}

impl Span {
    /// Calendar days covered by the span.
    pub fn days(&self) -> i64 {
        duration_days(self.start, self.end)
    }

    /// Returns true if the span covers no day at all.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Intersects an allocation's own span with a window.
///
/// When the allocation lies entirely outside the window the result is a
/// zero-length span sitting on the window boundary nearest the allocation.
/// Callers treat a zero-length span as contributing nothing.
///
/// The allocation is assumed to satisfy `start <= end`.
///
/// # Example
///
/// ```
/// use allocation_engine::models::{clip, Allocation, DateWindow};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let allocation = Allocation {
///     id: "a1".to_string(),
///     staff_id: "rse_001".to_string(),
///     project_id: "p1".to_string(),
///     percentage: Decimal::from(50),
///     start: d(1),
///     end: d(20),
///     deleted: false,
/// };
///
/// let span = clip(&allocation, &DateWindow::between(d(10), d(31)).unwrap());
/// assert_eq!((span.start, span.end), (d(10), d(20)));
/// ```
pub fn clip(allocation: &Allocation, window: &DateWindow) -> Span {
    clip_span(allocation.start, allocation.end, window)
}

/// Intersects `[start, end)` with a window. See [`clip`].
pub fn clip_span(start: NaiveDate, end: NaiveDate, window: &DateWindow) -> Span {
    let clipped_start = window.from.map_or(start, |f| start.max(f));
    let clipped_end = window.until.map_or(end, |u| end.min(u));

    if clipped_start <= clipped_end {
        return Span {
            start: clipped_start,
            end: clipped_end,
        };
    }

    // Empty intersection: park on the window edge closest to the interval.
    let boundary = match window.until {
        Some(until) if start > until => until,
        _ => clipped_start,
    };
    Span {
        start: boundary,
        end: boundary,
    }
}

/// Calendar days between two dates with exclusive-end semantics.
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Converts calendar days into working days: `days × working_days_per_year / 365`.
///
/// # Example
///
/// ```
/// use allocation_engine::models::working_days;
/// use rust_decimal::Decimal;
///
/// assert_eq!(working_days(365, Decimal::from(261)), Decimal::from(261));
/// assert_eq!(working_days(10, Decimal::from(365)), Decimal::from(10));
/// ```
pub fn working_days(calendar_days: i64, working_days_per_year: Decimal) -> Decimal {
    Decimal::from(calendar_days) * working_days_per_year / CALENDAR_DAYS_PER_YEAR
}

/// Converts working days back into calendar days: `days × 365 / working_days_per_year`.
///
/// Returns zero when `working_days_per_year` is not positive.
pub fn calendar_days(working_days: Decimal, working_days_per_year: Decimal) -> Decimal {
    if working_days_per_year <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    working_days * CALENDAR_DAYS_PER_YEAR / working_days_per_year
}
