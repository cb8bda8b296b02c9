//! Salary band models.
//!
//! A [`SalaryBand`] is an effective-dated salary for one staff member. The
//! bands of one staff member form a [`SalaryHistory`], ordered by
//! `effective_from`. A [`SalaryBook`] holds the histories handed to a cost
//! calculation.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::resolve_rate;
use crate::config::{EngineConfig, PayScaleBook};
use crate::error::{EngineError, EngineResult};

/// An effective-dated salary rate for a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBand {
    /// The staff member this band belongs to.
    pub staff_id: String,
    /// The salary grade.
    pub grade: u32,
    /// The point within the grade.
    pub grade_point: u32,
    /// Annual salary.
    pub annual_salary: Decimal,
    /// First day on which this band applies.
    pub effective_from: NaiveDate,
    /// Whether the grade point rises by one each financial year.
    #[serde(default)]
    pub increments_annually: bool,
}

/// The salary actually used for a date after lookup (and any projection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    /// Grade in force.
    pub grade: u32,
    /// Grade point in force.
    pub grade_point: u32,
    /// Annual salary in force.
    pub annual_salary: Decimal,
    /// Financial year the rate was resolved for.
    pub financial_year: i32,
    /// The band the rate was derived from.
    pub band_effective_from: NaiveDate,
    /// True when the band was carried into a later financial year.
    pub projected: bool,
}

/// All salary bands of one staff member, ordered by `effective_from`.
///
/// # Example
///
/// ```
/// use allocation_engine::models::{SalaryBand, SalaryHistory};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let band = |y, salary| SalaryBand {
///     staff_id: "rse_001".to_string(),
///     grade: 7,
///     grade_point: 1,
///     annual_salary: Decimal::from(salary),
///     effective_from: NaiveDate::from_ymd_opt(y, 8, 1).unwrap(),
///     increments_annually: false,
/// };
///
/// let history = SalaryHistory::new("rse_001", vec![band(2025, 37000), band(2024, 36000)]).unwrap();
/// let latest = history.latest_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap();
/// assert_eq!(latest.annual_salary, Decimal::from(36000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryHistory {
    staff_id: String,
    bands: Vec<SalaryBand>,
}

impl SalaryHistory {
    /// Creates a history, ordering the bands by `effective_from`.
    ///
    /// Fails if any band belongs to a different staff member.
    pub fn new(staff_id: impl Into<String>, mut bands: Vec<SalaryBand>) -> EngineResult<Self> {
        let staff_id = staff_id.into();
        if let Some(stray) = bands.iter().find(|b| b.staff_id != staff_id) {
            return Err(EngineError::CalculationError {
                message: format!(
                    "salary band for staff '{}' supplied in history of '{}'",
                    stray.staff_id, staff_id
                ),
            });
        }
        if !bands.is_sorted_by_key(|b| b.effective_from) {
            bands.sort_by_key(|b| b.effective_from);
        }
        Ok(Self { staff_id, bands })
    }

    /// The staff member this history belongs to.
    pub fn staff_id(&self) -> &str {
        &self.staff_id
    }

    /// All bands, oldest first.
    pub fn bands(&self) -> &[SalaryBand] {
        &self.bands
    }

    /// The band with the latest `effective_from` on or before `date`.
    pub fn latest_on(&self, date: NaiveDate) -> Option<&SalaryBand> {
        let idx = self.bands.partition_point(|b| b.effective_from <= date);
        idx.checked_sub(1).map(|i| &self.bands[i])
    }

    /// Resolves the salary in force on `date`. See [`resolve_rate`].
    pub fn rate_at(
        &self,
        date: NaiveDate,
        config: &EngineConfig,
        scales: Option<&PayScaleBook>,
    ) -> EngineResult<ResolvedRate> {
        resolve_rate(self, date, config, scales)
    }
}

/// Salary histories keyed by staff id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalaryBook {
    histories: HashMap<String, SalaryHistory>,
}

impl SalaryBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from loose bands, grouping them by staff member.
    pub fn from_bands(bands: Vec<SalaryBand>) -> Self {
        let mut grouped: HashMap<String, Vec<SalaryBand>> = HashMap::new();
        for band in bands {
            grouped.entry(band.staff_id.clone()).or_default().push(band);
        }
        let histories = grouped
            .into_iter()
            .map(|(staff_id, mut bands)| {
                bands.sort_by_key(|b| b.effective_from);
                let history = SalaryHistory {
                    staff_id: staff_id.clone(),
                    bands,
                };
                (staff_id, history)
            })
            .collect();
        Self { histories }
    }

    /// Adds or replaces a staff member's history.
    pub fn insert(&mut self, history: SalaryHistory) {
        self.histories.insert(history.staff_id.clone(), history);
    }

    /// Returns a staff member's history.
    pub fn get(&self, staff_id: &str) -> Option<&SalaryHistory> {
        self.histories.get(staff_id)
    }
}
