//! Project model.
//!
//! Projects come in distinct kinds with their own duration, FTE and value
//! formulas. The kind is a tagged variant ([`ProjectKind`]) and every
//! per-kind formula is a single `match`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

use super::interval::{CALENDAR_DAYS_PER_YEAR, calendar_days, working_days};

/// Where a project is in its funding lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Proposal being prepared.
    Preparation,
    /// Proposal under review by the funder.
    Review,
    /// Funded and going ahead.
    Funded,
    /// Not funded.
    Rejected,
}

/// Where a project is in time relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Not started yet.
    Scheduled,
    /// Running.
    Active,
    /// Finished.
    Completed,
}

/// Kind-specific project fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectKind {
    /// Cost-recovery project staffed at a fixed FTE between its start and end.
    DirectlyIncurred {
        /// FTE percentage for the project (may exceed 100).
        percentage: Decimal,
        /// Overhead charge per FTE working day.
        #[serde(default)]
        overheads: Decimal,
        /// Annual salary the project was costed at, if known.
        #[serde(default)]
        costed_salary: Option<Decimal>,
    },
    /// Fixed number of service days sold at a day rate.
    Service {
        /// Working days of service.
        days: u32,
        /// Charge per service day.
        rate: Decimal,
        /// Whether the service is actually invoiced.
        charged: bool,
    },
}

/// A project staff can be allocated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project.
    pub id: String,
    /// Human-readable project name.
    pub name: String,
    /// The client the work is for.
    #[serde(default)]
    pub client: String,
    /// Internal or in-kind projects carry no staff cost by default.
    #[serde(default)]
    pub internal: bool,
    /// First day of the project.
    pub start: NaiveDate,
    /// Day the project stops.
    pub end: NaiveDate,
    /// Funding status.
    pub status: ProjectStatus,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub kind: ProjectKind,
}

impl Project {
    /// Calendar days needed to complete the project.
    ///
    /// Directly incurred projects run from start to end. Service projects
    /// need their service days spread over calendar time at full FTE.
    ///
    /// # Example
    ///
    /// ```
    /// use allocation_engine::config::EngineConfig;
    /// use allocation_engine::models::{Project, ProjectKind, ProjectStatus};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let project = Project {
    ///     id: "p1".to_string(),
    ///     name: "Service".to_string(),
    ///     client: "Physics".to_string(),
    ///     internal: false,
    ///     start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    ///     status: ProjectStatus::Funded,
    ///     kind: ProjectKind::Service { days: 261, rate: Decimal::from(300), charged: true },
    /// };
    ///
    /// assert_eq!(project.duration(&EngineConfig::default()), 365);
    /// ```
    pub fn duration(&self, config: &EngineConfig) -> i64 {
        match &self.kind {
            ProjectKind::DirectlyIncurred { .. } => (self.end - self.start).num_days(),
            ProjectKind::Service { days, .. } => {
                let days = calendar_days(Decimal::from(*days), config.working_days_per_year);
                days.floor().to_i64().unwrap_or(i64::MAX)
            }
        }
    }

    /// FTE percentage the project is staffed at.
    pub fn fte(&self) -> Decimal {
        match &self.kind {
            ProjectKind::DirectlyIncurred { percentage, .. } => *percentage,
            ProjectKind::Service { .. } => Decimal::ONE_HUNDRED,
        }
    }

    /// Working days of effort the project represents.
    pub fn working_days(&self, config: &EngineConfig) -> Decimal {
        match &self.kind {
            ProjectKind::DirectlyIncurred { percentage, .. } => {
                working_days(self.duration(config), config.working_days_per_year) * *percentage
                    / Decimal::ONE_HUNDRED
            }
            ProjectKind::Service { days, .. } => Decimal::from(*days),
        }
    }

    /// Salary budget the project was costed with.
    pub fn staff_budget(&self, config: &EngineConfig) -> Decimal {
        match &self.kind {
            ProjectKind::DirectlyIncurred {
                percentage,
                costed_salary: Some(salary),
                ..
            } => {
                *salary * Decimal::from(self.duration(config)) / CALENDAR_DAYS_PER_YEAR
                    * *percentage
                    / Decimal::ONE_HUNDRED
            }
            ProjectKind::DirectlyIncurred { .. } | ProjectKind::Service { .. } => Decimal::ZERO,
        }
    }

    /// Overhead income over the project's working days.
    pub fn overhead_value(&self, config: &EngineConfig) -> Decimal {
        match &self.kind {
            ProjectKind::DirectlyIncurred { overheads, .. } => {
                *overheads * self.working_days(config)
            }
            ProjectKind::Service { .. } => Decimal::ZERO,
        }
    }

    /// Total monetary value of the project, rounded to cents.
    pub fn value(&self, config: &EngineConfig) -> Decimal {
        let value = match &self.kind {
            ProjectKind::DirectlyIncurred { .. } => {
                self.staff_budget(config) + self.overhead_value(config)
            }
            ProjectKind::Service {
                days,
                rate,
                charged,
            } => {
                if *charged {
                    Decimal::from(*days) * *rate
                } else {
                    Decimal::ZERO
                }
            }
        };
        value.round_dp(2)
    }

    /// Whether the project recovers cost. Internal projects and uncharged
    /// service never do.
    pub fn chargeable(&self) -> bool {
        match &self.kind {
            ProjectKind::DirectlyIncurred { .. } => !self.internal,
            ProjectKind::Service { charged, .. } => *charged && !self.internal,
        }
    }

    /// Returns true for service projects.
    pub fn is_service(&self) -> bool {
        matches!(self.kind, ProjectKind::Service { .. })
    }

    /// Plain-text name of the project kind.
    pub fn type_str(&self) -> &'static str {
        match self.kind {
            ProjectKind::DirectlyIncurred { .. } => "Directly Incurred",
            ProjectKind::Service { .. } => "Service",
        }
    }

    /// Where the project is in time as of `today`.
    pub fn schedule(&self, today: NaiveDate) -> Schedule {
        if today < self.start {
            Schedule::Scheduled
        } else if today > self.end {
            Schedule::Completed
        } else {
            Schedule::Active
        }
    }
}
