//! Request and response types for the engine service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Allocation, CommitmentEvent, DateWindow, Project, SalaryBand};

/// Input for a commitment timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineRequest {
    /// Allocations to sweep.
    pub allocations: Vec<Allocation>,
    /// Window to clip the timeline to.
    #[serde(default)]
    pub window: DateWindow,
}

/// Input for a cost calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRequest {
    /// Allocations to price.
    pub allocations: Vec<Allocation>,
    /// Window to clip the allocations to.
    #[serde(default)]
    pub window: DateWindow,
    /// Salary bands for every staff member referenced.
    pub salary_bands: Vec<SalaryBand>,
    /// Projects referenced by the allocations.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Leave allocations on internal projects out of the cost.
    #[serde(default)]
    pub exclude_internal: bool,
}

/// One owned point of a commitment timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentPoint {
    /// The date on which the commitment changes.
    pub date: NaiveDate,
    /// Total effort in force from `date`.
    pub cumulative_effort: Decimal,
    /// IDs of the allocations active from `date`.
    pub active_allocation_ids: Vec<String>,
}

impl From<&CommitmentEvent<'_>> for CommitmentPoint {
    fn from(event: &CommitmentEvent<'_>) -> Self {
        Self {
            date: event.date,
            cumulative_effort: event.cumulative_effort,
            active_allocation_ids: event
                .active_allocations
                .iter()
                .map(|a| a.id.clone())
                .collect(),
        }
    }
}
