//! Error types for the allocation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition the commitment and cost calculations can raise.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the allocation engine.
///
/// All fallible operations in the engine return this error type, so callers
/// can decide in one place whether to skip an allocation, abort a report or
/// flag a warning.
///
/// # Example
///
/// ```
/// use allocation_engine::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::NoSalaryData {
///     staff_id: "rse_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     reason: "no salary band effective on or before this date".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "No salary data for staff 'rse_001' on 2024-03-01: no salary band effective on or before this date"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// No salary band applies to a staff member on a required date.
    #[error("No salary data for staff '{staff_id}' on {date}: {reason}")]
    NoSalaryData {
        /// The staff member whose salary was requested.
        staff_id: String,
        /// The date the salary was required for.
        date: NaiveDate,
        /// Why the lookup failed.
        reason: String,
    },

    /// A date interval has its start after its end.
    #[error("Invalid interval for {subject}: start {start} is after end {end}")]
    InvalidInterval {
        /// What the interval belongs to (an allocation id, a query window...).
        subject: String,
        /// The interval start.
        start: NaiveDate,
        /// The interval end.
        end: NaiveDate,
    },

    /// An allocation carried a value the engine cannot work with.
    #[error("Invalid allocation '{allocation_id}': {message}")]
    InvalidAllocation {
        /// The ID of the invalid allocation.
        allocation_id: String,
        /// A description of what made the allocation invalid.
        message: String,
    },

    /// An allocation referenced a project that was not supplied.
    #[error("Project not found: {project_id}")]
    ProjectNotFound {
        /// The project ID that was not found.
        project_id: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
