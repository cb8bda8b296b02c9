//! The async service boundary around the engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    CostInputs, ProjectCommitment, capacity_at, compute_cost, compute_timeline,
    summarize_project,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{Allocation, CostResult, Project, ProjectStatus, SalaryBook};

use super::request::{CommitmentPoint, CostRequest, TimelineRequest};

/// Shared handle to the engine and its loaded configuration.
///
/// Calculations are synchronous and CPU-bound, so each call runs on the
/// blocking pool and the handle can be cloned freely across tasks.
#[derive(Clone)]
pub struct EngineService {
    config: Arc<ConfigLoader>,
}

impl EngineService {
    /// Creates a service with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Computes the commitment timeline for a set of allocations.
    pub async fn timeline(&self, request: TimelineRequest) -> EngineResult<Vec<CommitmentPoint>> {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            allocations_count = request.allocations.len(),
            "Processing timeline request"
        );

        let start_time = Instant::now();
        let result = run_blocking(move || {
            let timeline = compute_timeline(&request.allocations, &request.window)?;
            Ok(timeline.iter().map(CommitmentPoint::from).collect::<Vec<_>>())
        })
        .await;

        match &result {
            Ok(points) => info!(
                correlation_id = %correlation_id,
                events_count = points.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Timeline completed successfully"
            ),
            Err(err) => warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Timeline failed"
            ),
        }
        result
    }

    /// Prices a set of allocations against the supplied salary bands.
    ///
    /// The loaded pay scales are used for financial-year projection when any
    /// were configured.
    pub async fn cost(&self, request: CostRequest) -> EngineResult<CostResult> {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            allocations_count = request.allocations.len(),
            exclude_internal = request.exclude_internal,
            "Processing cost request"
        );

        let config = Arc::clone(&self.config);
        let start_time = Instant::now();
        let result = run_blocking(move || {
            let salaries = SalaryBook::from_bands(request.salary_bands);
            let projects: HashMap<String, Project> = request
                .projects
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect();

            let mut inputs = CostInputs::new(&salaries, &projects);
            if !config.scales().is_empty() {
                inputs = inputs.with_scales(config.scales());
            }

            compute_cost(
                &request.allocations,
                &request.window,
                &inputs,
                config.settings(),
                request.exclude_internal,
            )
        })
        .await;

        match &result {
            Ok(cost) => info!(
                correlation_id = %correlation_id,
                costed_count = cost.per_allocation.len(),
                total = %cost.total,
                duration_us = start_time.elapsed().as_micros(),
                "Cost completed successfully"
            ),
            Err(err) => warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Cost failed"
            ),
        }
        result
    }

    /// Summarises how much of a project's effort has been allocated.
    pub async fn project_summary(
        &self,
        project: Project,
        allocations: Vec<Allocation>,
    ) -> EngineResult<ProjectCommitment> {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            project_id = %project.id,
            "Processing project summary request"
        );

        let config = Arc::clone(&self.config);
        let summary = run_blocking(move || {
            Ok(summarize_project(&project, &allocations, config.settings()))
        })
        .await?;

        info!(
            correlation_id = %correlation_id,
            percent_allocated = %summary.percent_allocated,
            "Project summary completed successfully"
        );
        Ok(summary)
    }

    /// Effort a staff member has on `date` across allocations to funded projects.
    pub fn funded_capacity(
        &self,
        allocations: &[Allocation],
        projects: &HashMap<String, Project>,
        staff_id: &str,
        date: NaiveDate,
    ) -> Decimal {
        capacity_at(allocations, date, |a| {
            a.staff_id == staff_id
                && projects
                    .get(&a.project_id)
                    .is_some_and(|p| p.status == ProjectStatus::Funded)
        })
    }
}

async fn run_blocking<T, F>(job: F) -> EngineResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    task::spawn_blocking(job)
        .await
        .map_err(|err| EngineError::CalculationError {
            message: format!("calculation task failed: {err}"),
        })?
}
