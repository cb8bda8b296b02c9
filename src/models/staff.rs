//! Staff member model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A staff member who can be allocated to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Unique identifier for the staff member.
    pub id: String,
    /// Display name.
    pub name: String,
    /// First day of employment.
    pub employed_from: NaiveDate,
    /// Last day of the employment contract.
    pub employed_until: NaiveDate,
}

impl StaffMember {
    /// Returns true if the employment strictly overlaps `(from, until)`.
    pub fn employed_in_period(&self, from: NaiveDate, until: NaiveDate) -> bool {
        self.employed_from < until && self.employed_until > from
    }

    /// Returns true if the staff member is employed on `date`.
    ///
    /// Mirrors the strict comparison used for current employment: both
    /// contract boundary days count as outside employment, so a staff
    /// member is not employed on their own first or last day.
    pub fn is_employed_on(&self, date: NaiveDate) -> bool {
        self.employed_from < date && self.employed_until > date
    }
}
