//! Configuration types for the allocation engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, plus the defaults used
//! when the engine is driven directly from code.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default number of working days in a year.
pub const DEFAULT_WORKING_DAYS_PER_YEAR: Decimal = Decimal::from_parts(261, 0, 0, false, 0);

/// Settings that every engine computation receives explicitly.
///
/// # Example
///
/// ```
/// use allocation_engine::config::EngineConfig;
/// use chrono::NaiveDate;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.financial_year_of(NaiveDate::from_ymd_opt(2024, 7, 31).unwrap()), 2023);
/// assert_eq!(config.financial_year_of(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()), 2024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Working days in a year, used to turn calendar days into cost-bearing days.
    pub working_days_per_year: Decimal,
    /// Month (1-12) on which the financial year starts.
    pub financial_year_start_month: u32,
    /// Day of month (1-28) on which the financial year starts.
    pub financial_year_start_day: u32,
    /// When set, project cost queries are clipped to the project's own span.
    #[serde(default = "default_strict_allocation_window")]
    pub strict_allocation_window: bool,
}

fn default_strict_allocation_window() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            working_days_per_year: DEFAULT_WORKING_DAYS_PER_YEAR,
            financial_year_start_month: 8,
            financial_year_start_day: 1,
            strict_allocation_window: true,
        }
    }
}

impl EngineConfig {
    /// Returns a default configuration with a different working-day ratio.
    pub fn with_working_days_per_year(working_days_per_year: Decimal) -> Self {
        Self {
            working_days_per_year,
            ..Self::default()
        }
    }

    /// Checks the settings are usable for calculation.
    pub fn validate(&self) -> EngineResult<()> {
        if self.working_days_per_year <= Decimal::ZERO {
            return Err(EngineError::CalculationError {
                message: format!(
                    "working_days_per_year must be positive, got {}",
                    self.working_days_per_year
                ),
            });
        }
        if !(1..=12).contains(&self.financial_year_start_month)
            || !(1..=28).contains(&self.financial_year_start_day)
        {
            return Err(EngineError::CalculationError {
                message: format!(
                    "financial year start {}-{} is not a valid month/day",
                    self.financial_year_start_month, self.financial_year_start_day
                ),
            });
        }
        Ok(())
    }

    /// Returns the financial year a date belongs to.
    ///
    /// A financial year is named after the calendar year in which it starts.
    pub fn financial_year_of(&self, date: NaiveDate) -> i32 {
        let starts_after = (date.month(), date.day())
            < (self.financial_year_start_month, self.financial_year_start_day);
        if starts_after {
            date.year() - 1
        } else {
            date.year()
        }
    }

    /// Returns the first day of the given financial year.
    pub fn financial_year_start(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            year,
            self.financial_year_start_month,
            self.financial_year_start_day,
        )
    }
}

/// A single point on a pay scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalePoint {
    /// The salary grade.
    pub grade: u32,
    /// The point within the grade.
    pub grade_point: u32,
    /// Annual salary at this grade point.
    pub annual_salary: Decimal,
}

/// The pay scale in force for one financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayScale {
    /// The financial year this scale applies to.
    pub year: i32,
    /// Every grade point defined for the year.
    pub points: Vec<ScalePoint>,
}

/// Pay scales for every financial year that has one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayScaleBook {
    scales: BTreeMap<i32, PayScale>,
}

impl PayScaleBook {
    /// Creates a book from a set of yearly scales. Later duplicates win.
    pub fn new(scales: Vec<PayScale>) -> Self {
        Self {
            scales: scales.into_iter().map(|s| (s.year, s)).collect(),
        }
    }

    /// Returns the scale for a financial year.
    pub fn scale(&self, year: i32) -> Option<&PayScale> {
        self.scales.get(&year)
    }

    /// Returns all financial years with a scale, oldest first.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.scales.keys().copied()
    }

    /// Returns true when no scale has been loaded.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Finds the salary for a grade point, falling back to the highest
    /// point of the grade that does not exceed `grade_point`.
    pub fn lookup(&self, year: i32, grade: u32, grade_point: u32) -> Option<&ScalePoint> {
        self.scale(year)?
            .points
            .iter()
            .filter(|p| p.grade == grade && p.grade_point <= grade_point)
            .max_by_key(|p| p.grade_point)
    }
}
