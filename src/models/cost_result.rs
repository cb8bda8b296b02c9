//! Cost result models.
//!
//! This module contains the [`CostResult`] returned by cost calculations,
//! its per-allocation breakdown, and the audit steps that record how each
//! amount was reached.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ResolvedRate, Span};

/// How the cost of one allocation was reached.
///
/// Allocations whose clipped span is empty are still recorded, with a zero
/// amount and no rate, so reports can tell "no cost in period" apart from
/// "allocation absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCost {
    /// The allocation this cost belongs to.
    pub allocation_id: String,
    /// The allocated staff member.
    pub staff_id: String,
    /// The project the allocation is on.
    pub project_id: String,
    /// The allocation span after clipping to the query window.
    pub span: Span,
    /// Calendar days in the clipped span.
    pub calendar_days: i64,
    /// Working days in the clipped span.
    pub working_days: Decimal,
    /// Percentage of full-time effort.
    pub percentage: Decimal,
    /// The salary used, if the span was non-empty.
    pub rate: Option<ResolvedRate>,
    /// Annual salary divided by working days per year.
    pub daily_rate: Decimal,
    /// Cost attributed to the allocation, rounded to cents.
    pub amount: Decimal,
}

/// A single step in the audit trace recording a costing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The total cost of a set of allocations and its breakdown.
///
/// `total` is always the exact sum of the per-allocation amounts.
///
/// # Example
///
/// ```
/// use allocation_engine::models::CostResult;
/// use rust_decimal::Decimal;
///
/// let result = CostResult::default();
/// assert_eq!(result.total, Decimal::ZERO);
/// assert!(result.per_allocation.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostResult {
    /// Sum of every per-allocation amount.
    pub total: Decimal,
    /// Breakdown keyed by allocation id.
    pub per_allocation: BTreeMap<String, AllocationCost>,
    /// Every costing decision, in the order it was made.
    pub audit_trace: Vec<AuditStep>,
}

impl CostResult {
    /// Adds an allocation's cost to the result.
    pub(crate) fn record(&mut self, cost: AllocationCost, step: AuditStep) {
        self.total += cost.amount;
        self.per_allocation.insert(cost.allocation_id.clone(), cost);
        self.audit_trace.push(step);
    }

    /// The amount attributed to an allocation, if it was costed.
    pub fn amount_for(&self, allocation_id: &str) -> Option<Decimal> {
        self.per_allocation.get(allocation_id).map(|c| c.amount)
    }

    /// Totals grouped by staff member.
    pub fn total_by_staff(&self) -> BTreeMap<&str, Decimal> {
        let mut totals = BTreeMap::new();
        for cost in self.per_allocation.values() {
            *totals.entry(cost.staff_id.as_str()).or_insert(Decimal::ZERO) += cost.amount;
        }
        totals
    }

    /// Totals grouped by project.
    pub fn total_by_project(&self) -> BTreeMap<&str, Decimal> {
        let mut totals = BTreeMap::new();
        for cost in self.per_allocation.values() {
            *totals.entry(cost.project_id.as_str()).or_insert(Decimal::ZERO) += cost.amount;
        }
        totals
    }
}
