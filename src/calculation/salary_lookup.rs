//! Salary rate resolution.
//!
//! This module finds the salary that applies to a staff member on a given
//! date: the latest band effective on or before the date, projected into the
//! date's financial year when the band was set in an earlier one.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{EngineConfig, PayScaleBook};
use crate::error::{EngineError, EngineResult};
use crate::models::{ResolvedRate, SalaryHistory};

fn no_salary(staff_id: &str, date: NaiveDate, reason: String) -> EngineError {
    EngineError::NoSalaryData {
        staff_id: staff_id.to_string(),
        date,
        reason,
    }
}

/// Resolves the salary in force for a staff member on `date`.
///
/// 1. The band with the latest `effective_from` on or before `date` is selected.
/// 2. If that band was set in the same financial year as `date`, its salary applies.
/// 3. Otherwise, when pay scales are supplied, the band's grade point is
///    looked up in the scale for `date`'s financial year, advanced by one
///    point per financial year crossed if the band increments annually and
///    capped at the top point of the grade.
/// 4. With no pay scales supplied, a band from an earlier financial year
///    does not apply.
///
/// # Errors
///
/// Returns `NoSalaryData` if no band is effective on or before `date`, if
/// `date`'s financial year has no band and no pay scales were supplied, if
/// the pay scales have no entry for `date`'s financial year, or if that
/// year's scale lacks the band's grade.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::resolve_rate;
/// use allocation_engine::config::EngineConfig;
/// use allocation_engine::models::{SalaryBand, SalaryHistory};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let history = SalaryHistory::new("rse_001", vec![SalaryBand {
///     staff_id: "rse_001".to_string(),
///     grade: 7,
///     grade_point: 1,
///     annual_salary: Decimal::from(36500),
///     effective_from: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
///     increments_annually: true,
/// }]).unwrap();
///
/// let config = EngineConfig::default();
/// let rate = resolve_rate(&history, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(), &config, None).unwrap();
/// assert_eq!(rate.annual_salary, Decimal::from(36500));
///
/// let early = resolve_rate(&history, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), &config, None);
/// assert!(early.is_err());
/// ```
pub fn resolve_rate(
    history: &SalaryHistory,
    date: NaiveDate,
    config: &EngineConfig,
    scales: Option<&PayScaleBook>,
) -> EngineResult<ResolvedRate> {
    let staff_id = history.staff_id();
    let band = history.latest_on(date).ok_or_else(|| {
        no_salary(
            staff_id,
            date,
            "no salary band effective on or before this date".to_string(),
        )
    })?;

    let band_year = config.financial_year_of(band.effective_from);
    let year = config.financial_year_of(date);

    if band_year == year {
        return Ok(ResolvedRate {
            grade: band.grade,
            grade_point: band.grade_point,
            annual_salary: band.annual_salary,
            financial_year: year,
            band_effective_from: band.effective_from,
            projected: false,
        });
    }

    let Some(scales) = scales else {
        return Err(no_salary(
            staff_id,
            date,
            format!("no salary band for financial year {year}"),
        ));
    };

    if scales.scale(year).is_none() {
        return Err(no_salary(
            staff_id,
            date,
            format!("no pay scale for financial year {year}"),
        ));
    }

    let years_crossed = u32::try_from(year - band_year).unwrap_or(0);
    let target_point = if band.increments_annually {
        band.grade_point.saturating_add(years_crossed)
    } else {
        band.grade_point
    };

    let point = scales
        .lookup(year, band.grade, target_point)
        .ok_or_else(|| {
            no_salary(
                staff_id,
                date,
                format!(
                    "pay scale for financial year {year} has no grade {} point {} or below",
                    band.grade, target_point
                ),
            )
        })?;

    debug!(
        staff_id,
        %date,
        band_year,
        year,
        grade = point.grade,
        grade_point = point.grade_point,
        "Projected salary band into later financial year"
    );

    Ok(ResolvedRate {
        grade: point.grade,
        grade_point: point.grade_point,
        annual_salary: point.annual_salary,
        financial_year: year,
        band_effective_from: band.effective_from,
        projected: true,
    })
}
