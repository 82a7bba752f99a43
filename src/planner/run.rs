use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{PlanError, Result};
use crate::models::{PlanPolicy, PlanSolution};
use crate::planner::extract::{extract_solution, verify_solution};
use crate::planner::model::MilpModel;
use crate::report::PlanReport;
use crate::solver::{GoodLpBackend, MilpBackend, ProgressSink, SolveOutcome, SolverAdapter};

/// One optimization run: inputs, the model built from them, and the adapter
/// that solves it at most once.
///
/// A new run is needed for different inputs; nothing here is re-solved
/// incrementally.
pub struct PlanningRun {
    catalog: Catalog,
    policy: PlanPolicy,
    adapter: SolverAdapter,
}

impl PlanningRun {
    /// Build the model for the default `good_lp` backend.
    pub fn new(catalog: Catalog, policy: PlanPolicy) -> Result<Self> {
        Self::with_backend(catalog, policy, Box::new(GoodLpBackend::new()))
    }

    pub fn with_backend(
        catalog: Catalog,
        policy: PlanPolicy,
        backend: Box<dyn MilpBackend>,
    ) -> Result<Self> {
        let model = MilpModel::build(&catalog, &policy)?;
        let adapter = SolverAdapter::new(model, policy.solver.clone(), backend);
        Ok(Self {
            catalog,
            policy,
            adapter,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &PlanPolicy {
        &self.policy
    }

    pub fn model(&self) -> &MilpModel {
        self.adapter.model()
    }

    pub fn adapter(&self) -> &SolverAdapter {
        &self.adapter
    }

    pub fn solve(&self) -> Result<Arc<SolveOutcome>> {
        self.adapter.solve()
    }

    pub fn solve_with<S: ProgressSink>(&self, sink: &mut S) -> Result<Arc<SolveOutcome>> {
        self.adapter.solve_with(sink)
    }

    /// Terminal outcome, if the run has been solved.
    pub fn status(&self) -> Option<Arc<SolveOutcome>> {
        self.adapter.cached()
    }

    /// The extracted and re-verified weekly plan.
    ///
    /// # Errors
    ///
    /// `NotSolved` before a successful solve, `Infeasible` when the solver
    /// proved there is no plan, `InvariantViolation` if the extracted plan
    /// fails its own consistency check.
    pub fn schedule(&self) -> Result<PlanSolution> {
        let outcome = self.adapter.cached().ok_or(PlanError::NotSolved)?;
        let assignment = outcome.assignment().ok_or(PlanError::Infeasible)?;

        let solution = extract_solution(self.model(), &self.catalog, &self.policy, assignment);
        let violations = verify_solution(&solution, &self.catalog, &self.policy)?;
        if !violations.is_empty() {
            return Err(PlanError::InvariantViolation(violations));
        }
        Ok(solution)
    }

    /// Reporting views of the verified plan.
    pub fn report(&self) -> Result<PlanReport> {
        let solution = self.schedule()?;
        Ok(PlanReport::build(&solution, &self.catalog, &self.policy))
    }
}
