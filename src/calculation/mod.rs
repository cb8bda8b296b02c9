//! Calculation logic for the allocation engine.
//!
//! This module contains the commitment sweep over allocation endpoints,
//! salary rate resolution with financial-year projection, allocation cost
//! accounting, and the project commitment summary.

mod commitment;
mod cost;
mod project_summary;
mod salary_lookup;

pub use commitment::{capacity_at, commitment_by_staff, compute_timeline};
pub use cost::{CostInputs, compute_cost, project_staff_cost, staff_cost};
pub use project_summary::{
    ProjectCommitment, allocation_share, project_days, scheduled_working_days_to,
    summarize_project,
};
pub use salary_lookup::resolve_rate;
