//! Commitment timeline models.
//!
//! A [`Timeline`] is the output of the sweep over allocation endpoints: one
//! [`CommitmentEvent`] per distinct date on which total effort changes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::Allocation;

/// The commitment in force from `date` until the next event.
///
/// `active_allocations` is an independent snapshot taken when the event was
/// emitted, ordered as the allocations were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitmentEvent<'a> {
    /// The date on which the commitment changes.
    pub date: NaiveDate,
    /// Sum of the percentages of every allocation active on `date`.
    pub cumulative_effort: Decimal,
    /// Allocations active on `date`.
    pub active_allocations: Vec<&'a Allocation>,
}

impl CommitmentEvent<'_> {
    /// IDs of the active allocations.
    pub fn active_ids(&self) -> Vec<&str> {
        self.active_allocations
            .iter()
            .map(|a| a.id.as_str())
            .collect()
    }
}

/// Ordered, de-duplicated commitment events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline<'a> {
    events: Vec<CommitmentEvent<'a>>,
}

impl<'a> Timeline<'a> {
    /// Wraps events already sorted by strictly increasing date.
    pub(crate) fn from_events(events: Vec<CommitmentEvent<'a>>) -> Self {
        Self { events }
    }

    /// All events in date order.
    pub fn events(&self) -> &[CommitmentEvent<'a>] {
        &self.events
    }

    /// Iterates events in date order.
    pub fn iter(&self) -> std::slice::Iter<'_, CommitmentEvent<'a>> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the timeline has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Dates and cumulative effort only, for charting.
    pub fn effort_series(&self) -> Vec<(NaiveDate, Decimal)> {
        self.events
            .iter()
            .map(|e| (e.date, e.cumulative_effort))
            .collect()
    }

    /// Cumulative effort in force on `date`: the latest event on or before it.
    ///
    /// Zero before the first event.
    pub fn effort_at(&self, date: NaiveDate) -> Decimal {
        let idx = self.events.partition_point(|e| e.date <= date);
        idx.checked_sub(1)
            .map_or(Decimal::ZERO, |i| self.events[i].cumulative_effort)
    }

    /// The earliest event with the highest cumulative effort.
    pub fn peak(&self) -> Option<&CommitmentEvent<'a>> {
        self.events.iter().reduce(|best, e| {
            if e.cumulative_effort > best.cumulative_effort {
                e
            } else {
                best
            }
        })
    }
}

impl<'a, 'b> IntoIterator for &'b Timeline<'a> {
    type Item = &'b CommitmentEvent<'a>;
    type IntoIter = std::slice::Iter<'b, CommitmentEvent<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
