//! Core data models for the allocation engine.
//!
//! This module contains the input records (allocations, salary bands,
//! projects, staff), the half-open interval helpers they share, and the
//! result types produced by the calculations.

mod allocation;
mod commitment;
mod cost_result;
mod interval;
mod project;
mod salary;
mod staff;

pub use allocation::{Allocation, AllocationFilter, allocation_span};
pub use commitment::{CommitmentEvent, Timeline};
pub use cost_result::{AllocationCost, AuditStep, CostResult};
pub use interval::{
    CALENDAR_DAYS_PER_YEAR, DateWindow, Span, calendar_days, clip, clip_span, duration_days,
    working_days,
};
pub use project::{Project, ProjectKind, ProjectStatus, Schedule};
pub use salary::{ResolvedRate, SalaryBand, SalaryBook, SalaryHistory};
pub use staff::StaffMember;
